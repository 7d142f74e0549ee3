// src/provider/resolver.rs — API key discovery and provider construction

use std::sync::Arc;

use super::google::GeminiImageProvider;
use super::{ImageGenerator, ModelRef};
use crate::infra::config::Config;
use crate::infra::credentials;
use crate::infra::errors::PixshopError;

/// Environment variables checked for a Gemini key, in order.
pub const GOOGLE_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Resolve an API key from env vars first, then the saved credential file.
pub async fn resolve_key(env_vars: &[&str], provider_id: &str) -> Option<String> {
    for var in env_vars {
        if let Ok(key) = std::env::var(var) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                tracing::debug!(var, "API key taken from environment");
                return Some(key);
            }
        }
    }
    credentials::load_credential(provider_id).await
}

/// Build the configured image generator. `model_override` is either a bare
/// model name or "provider/model".
pub async fn resolve_generator(
    config: &Config,
    model_override: Option<&str>,
) -> Result<Arc<dyn ImageGenerator>, PixshopError> {
    let model_ref = select_model(config, model_override);

    match model_ref.provider.as_str() {
        "google" | "gemini" => {
            let key = resolve_key(GOOGLE_KEY_VARS, "google")
                .await
                .ok_or(PixshopError::NoProvider)?;
            let provider =
                GeminiImageProvider::with_config(key, model_ref.model.clone(), &config.generation)?;
            tracing::info!("Using {}", model_ref);
            Ok(Arc::new(provider))
        }
        other => Err(PixshopError::Config(format!(
            "Unsupported provider '{other}'. Only 'google' can edit images."
        ))),
    }
}

/// Pick the model: CLI override > config.
pub fn select_model(config: &Config, model_override: Option<&str>) -> ModelRef {
    match model_override {
        Some(s) => ModelRef::parse(s)
            .unwrap_or_else(|| ModelRef::new(config.model.provider.clone(), s.to_string())),
        None => ModelRef::new(config.model.provider.clone(), config.model.name.clone()),
    }
}
