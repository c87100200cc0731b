use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrikeError {
    #[error("not signed in")]
    Unauthenticated,

    /// Non-2xx response. `detail` is what the backend said, shown to the user as is.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response from server: {0}")]
    Decode(String),

    #[error("{0}")]
    Invalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("could not encode QR code: {0}")]
    Qr(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StrikeError {
    pub fn status(&self) -> Option<u16> {
        match self {
            StrikeError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StrikeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StrikeError::Decode(e.to_string())
        } else {
            StrikeError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, StrikeError>;
