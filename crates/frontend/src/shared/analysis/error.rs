use thiserror::Error;

/// Failure of one analysis fetch, already classified for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx whose body is not a JSON payload
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The selection moved on while the request was in flight
    #[error("Stale response discarded")]
    Stale,
}

impl FetchError {
    /// Banner text; `None` for errors that are never shown
    pub fn user_message(&self) -> Option<String> {
        match self {
            FetchError::Network(_) => {
                Some("Falha de conexão com o servidor. Tente novamente.".to_string())
            }
            FetchError::Http { message, .. } => Some(message.clone()),
            FetchError::Decode(_) => Some("Resposta inválida do servidor.".to_string()),
            FetchError::Stale => None,
        }
    }
}

/// Internal render failure. Logged by the adapters, never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("render target '{0}' not found")]
    TargetMissing(String),

    #[error("render backend error: {0}")]
    Backend(String),
}

/// Durable key-value storage failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage write failed: {0}")]
    Write(String),
}
