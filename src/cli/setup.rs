// src/cli/setup.rs — Save the API key

use crate::infra::credentials;

pub async fn run_setup(api_key: &str) -> anyhow::Result<()> {
    let path = credentials::save_credential("google", api_key).await?;
    println!("API key saved to {}", path.display());
    Ok(())
}
