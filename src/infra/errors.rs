// src/infra/errors.rs — Error types for pixshop

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixshopError {
    // User errors (surfaced in the message slot)
    #[error("{0}")]
    InvalidInput(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("An edit is already in progress")]
    AlreadyInProgress,

    // Collaborator errors
    #[error("Provider '{provider}' error: {message}")]
    Generation { provider: String, message: String },

    #[error("The edit task stopped unexpectedly: {0}")]
    TaskFailed(String),

    #[error("No API key configured. Run `pixshop setup --api-key <KEY>` or set GEMINI_API_KEY.")]
    NoProvider,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixshopError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PixshopError::InvalidInput(message.into())
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PixshopError::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Text shown to the user after "Failed to generate the image.".
    ///
    /// Generation failures pass the collaborator's message through without
    /// the provider prefix.
    pub fn detail(&self) -> String {
        match self {
            PixshopError::Generation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
