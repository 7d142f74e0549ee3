// src/provider/mod.rs — Image generation provider layer

pub mod google;
pub mod resolver;

use async_trait::async_trait;

use crate::core::snapshot::Snapshot;
use crate::infra::errors::PixshopError;

/// The external service that turns (image, instruction) into a new image.
///
/// Implementations return the edited image as a `data:` URI. The dispatcher
/// decodes it; a payload that does not decode is treated as a failure.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn id(&self) -> &str;
    fn model(&self) -> &str;

    async fn generate(&self, image: &Snapshot, instruction: &str) -> Result<String, PixshopError>;
}

/// Reference to a specific model on a specific provider.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

impl ModelRef {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Parse "provider/model" format
    pub fn parse(s: &str) -> Option<Self> {
        let (provider, model) = s.split_once('/')?;
        if provider.is_empty() || model.is_empty() {
            return None;
        }
        Some(Self::new(provider, model))
    }
}

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
