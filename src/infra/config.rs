// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "google".into(),
            name: "gemini-2.5-flash-image-preview".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on a single generation request. There is no retry.
    pub timeout_seconds: u64,
    /// Override for the API base URL (proxies, test servers).
    pub base_url: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Download directory; the current directory when unset.
    pub dir: Option<String>,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "pixshop-edit".into(),
        }
    }
}

impl OutputConfig {
    pub fn dir_or_cwd(&self) -> PathBuf {
        self.dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.model.provider, "google");
        assert_eq!(c.model.name, "gemini-2.5-flash-image-preview");
        assert_eq!(c.generation.timeout_seconds, 120);
        assert!(c.generation.base_url.is_none());
        assert_eq!(c.output.prefix, "pixshop-edit");
        assert_eq!(c.output.dir_or_cwd(), PathBuf::from("."));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.generation.timeout_seconds, 120);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[model]
provider = "google"
name = "gemini-2.0-flash-preview-image-generation"

[generation]
timeout_seconds = 30
base_url = "http://127.0.0.1:9000/v1beta"

[output]
dir = "/tmp/edits"
prefix = "shot"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.name, "gemini-2.0-flash-preview-image-generation");
        assert_eq!(config.generation.timeout_seconds, 30);
        assert_eq!(
            config.generation.base_url.as_deref(),
            Some("http://127.0.0.1:9000/v1beta")
        );
        assert_eq!(config.output.dir_or_cwd(), PathBuf::from("/tmp/edits"));
        assert_eq!(config.output.prefix, "shot");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.model.name, config.model.name);
        assert_eq!(deserialized.output.prefix, config.output.prefix);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[output]\nprefix = \"mine\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.prefix, "mine");
        assert_eq!(config.model.provider, "google");
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let config: Config = toml::from_str("[output]\ndir = \"out\"\n").unwrap();
        assert_eq!(config.output.prefix, "pixshop-edit");
        assert_eq!(config.output.dir_or_cwd(), PathBuf::from("out"));
    }
}
