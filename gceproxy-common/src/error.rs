use thiserror::Error;

/// Failures reported by a compute provider backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider authentication failed: {0}")]
    Authentication(String),

    #[error("instance not found: {0}")]
    NotFound(String),

    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider unreachable: {0}")]
    Transport(String),

    #[error("invalid provider credentials: {0}")]
    Credentials(String),

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Authentication(_) => "provider_auth_failed",
            ProviderError::NotFound(_) => "instance_not_found",
            ProviderError::Api { .. } => "provider_error",
            ProviderError::Transport(_) => "provider_unreachable",
            ProviderError::Credentials(_) => "provider_credentials_invalid",
            ProviderError::Decode(_) => "provider_bad_response",
        }
    }
}
