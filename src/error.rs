use crate::emotion::Emotion;
use thiserror::Error;

/// Rejections raised on a diary draft before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a diary entry needs at least one image")]
    NoImages,

    #[error("a diary entry needs at least one emotion")]
    NoEmotions,

    #[error("emotion {0} was selected more than once")]
    DuplicateEmotion(Emotion),

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("authentication required: no bearer token stored")]
    AuthenticationRequired,

    #[error("token is set by MINDLOG_TOKEN; unset it to log out")]
    FixedCredentials,

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid diary entry: {0}")]
    Validation(#[from] ValidationError),

    #[error("server responded with status {status}")]
    ServerResponse { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image could not be compressed: {0}")]
    Image(#[from] image::ImageError),

    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// True when the server was reached but answered with something unusable.
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            ServiceError::ServerResponse { .. } | ServiceError::Decoding(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not determine a home directory; set MINDLOG_DATA_DIR")]
    NoHomeDir,
}
