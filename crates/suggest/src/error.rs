use input_core::InputId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("{0} is not bound to a suggestion engine")]
    UnknownField(InputId),

    #[error("service returned {code}: {message}")]
    Service { code: String, message: String },

    #[error("unrecognized response: {0}")]
    UnrecognizedResponse(String),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, SuggestError>;
