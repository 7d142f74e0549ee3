// src/cli/edit.rs — One-shot edit: load, submit, download

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::dispatcher::Dispatcher;
use crate::core::export;
use crate::core::presets;
use crate::core::snapshot::ImageData;
use crate::infra::config::Config;
use crate::provider::ImageGenerator;

/// Turn `--prompt` / `--preset` into the instruction to send.
pub fn resolve_instruction(prompt: Option<&str>, preset: Option<&str>) -> anyhow::Result<String> {
    match (prompt, preset) {
        (_, Some(name)) => presets::lookup(name)
            .map(|p| p.instruction.to_string())
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown preset '{}'. Run `pixshop presets` to list them.", name)
            }),
        (Some(text), None) => Ok(text.to_string()),
        (None, None) => anyhow::bail!("Either --prompt or --preset is required"),
    }
}

/// Apply a single edit to `image` and write the result. Returns the path
/// written.
pub async fn run_edit(
    generator: Arc<dyn ImageGenerator>,
    config: &Config,
    image: &Path,
    instruction: &str,
    output: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<PathBuf> {
    let mut dispatcher = Dispatcher::new(generator);
    if !quiet {
        dispatcher = dispatcher.with_progress(super::progress::terminal_progress());
    }

    let original = ImageData::read(image).await?;
    if let Err(e) = dispatcher.load(original) {
        anyhow::bail!("{}: {}", image.display(), e);
    }

    let edited = match dispatcher.submit(instruction).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // The message slot carries the user-facing wording.
            let message = dispatcher.error().unwrap_or_else(|| e.to_string());
            anyhow::bail!(message);
        }
    };

    let dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output.dir_or_cwd());
    let path = export::download(&edited, &dir, &config.output.prefix).await?;
    println!("{}", path.display());
    Ok(path)
}
