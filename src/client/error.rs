/// Why a remote call did not produce a usable answer. Every variant sends
/// the repository down the local path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchFailure {
    #[error("remote service marked unavailable")]
    Unavailable,

    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("remote request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchFailure {
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Network(err.to_string())
        }
    }

    /// Failures that indicate an outage rather than a bad request.
    pub fn signals_outage(&self) -> bool {
        match self {
            FetchFailure::Timeout | FetchFailure::Network(_) => true,
            FetchFailure::Status { status, .. } => *status >= 500,
            FetchFailure::Unavailable | FetchFailure::Decode(_) => false,
        }
    }
}

/// Rejected input on a write. Never falls back; the caller must fix it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Local persistence failure. Logged and swallowed by the local store.
#[derive(Debug, thiserror::Error)]
pub enum LocalStorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
