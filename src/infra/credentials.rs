// src/infra/credentials.rs — API key storage with filesystem permissions

use anyhow::Result;
#[cfg(unix)]
use std::fs::Permissions;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::infra::paths;

/// Save an API key for a provider. File is chmod 600, directory is chmod 700.
pub async fn save_credential(provider: &str, key: &str) -> Result<PathBuf> {
    save_credential_in(&paths::credentials_dir(), provider, key).await
}

/// Load a saved credential for a provider.
pub async fn load_credential(provider: &str) -> Option<String> {
    load_credential_in(&paths::credentials_dir(), provider).await
}

pub async fn save_credential_in(dir: &Path, provider: &str, key: &str) -> Result<PathBuf> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key for '{provider}' is empty");
    }

    tokio::fs::create_dir_all(dir).await?;
    #[cfg(unix)]
    tokio::fs::set_permissions(dir, Permissions::from_mode(0o700)).await?;

    let key_path = dir.join(format!("{provider}.key"));
    tokio::fs::write(&key_path, key).await?;
    #[cfg(unix)]
    tokio::fs::set_permissions(&key_path, Permissions::from_mode(0o600)).await?;

    tracing::debug!(provider, path = %key_path.display(), "Credential saved");
    Ok(key_path)
}

pub async fn load_credential_in(dir: &Path, provider: &str) -> Option<String> {
    let key_path = dir.join(format!("{provider}.key"));
    tokio::fs::read_to_string(&key_path)
        .await
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
