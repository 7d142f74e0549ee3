// src/infra/paths.rs — Config, credential and cache locations
//
// All paths respect the PIXSHOP_HOME environment variable for isolation.
// When PIXSHOP_HOME is set, everything lives under that directory.
// When unset, everything lives under ~/.pixshop/.

use std::path::PathBuf;

/// Returns the PIXSHOP_HOME override, if set.
fn pixshop_home() -> Option<PathBuf> {
    std::env::var_os("PIXSHOP_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when it cannot be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $PIXSHOP_HOME/ or ~/.pixshop/
pub fn config_dir() -> PathBuf {
    if let Some(home) = pixshop_home() {
        return home;
    }
    dirs_home().join(".pixshop")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Credentials directory
pub fn credentials_dir() -> PathBuf {
    config_dir().join("credentials")
}

/// Cache directory: ~/.pixshop/cache/
pub fn cache_dir() -> PathBuf {
    config_dir().join("cache")
}

/// Where the interactive session writes the preview of the current version.
pub fn preview_dir() -> PathBuf {
    cache_dir().join("preview")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    let dirs = [config_dir(), credentials_dir(), cache_dir(), preview_dir()];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await?;
    }

    Ok(())
}
