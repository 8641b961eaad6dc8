//! Error types for Parley

use thiserror::Error;

/// Result type alias using Parley's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a request can fail between the inbound boundary and the gateway
#[derive(Error, Debug)]
pub enum Error {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Invalid events format: {0}")]
    InvalidEventsFormat(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJsonBody(String),

    #[error("System prompt is not configured")]
    SystemPromptUnconfigured,

    #[error("Server configuration error: {0}")]
    ServerConfiguration(String),

    #[error("Failed to initialize translator: {0}")]
    TranslatorInitFailed(String),

    /// Upstream answered with a non-2xx status. `detail` is the raw upstream
    /// body and never reaches the client.
    #[error("AI Gateway error: {status}")]
    Gateway { status: u16, detail: String },

    #[error("Failed to process request: {0}")]
    ProcessingFailed(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status the boundary layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MethodNotAllowed => 405,
            Error::MissingPrompt | Error::InvalidEventsFormat(_) | Error::InvalidJsonBody(_) => {
                400
            }
            Error::Gateway { status, .. } => *status,
            Error::SystemPromptUnconfigured
            | Error::ServerConfiguration(_)
            | Error::TranslatorInitFailed(_)
            | Error::ProcessingFailed(_)
            | Error::Cache(_)
            | Error::Serialization(_) => 500,
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
