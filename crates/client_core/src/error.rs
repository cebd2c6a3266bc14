//! Error taxonomy of a submission attempt.

use std::time::Duration;

use shared::domain::InputRef;
use thiserror::Error;

/// The request never produced a usable reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
    #[error("request was cancelled")]
    Cancelled,
    #[error("malformed response (status {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        TransportError::Network(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// Detected locally; nothing was sent.
    #[error("missing required inputs: {}", describe_missing(.missing))]
    Validation { missing: Vec<InputRef> },
    /// The server answered with a non-ok status.
    #[error("server rejected request with status {status}: {message}")]
    Application { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl UploadError {
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation { .. })
    }
}

pub(crate) fn describe_missing(missing: &[InputRef]) -> String {
    missing
        .iter()
        .map(|input| input.element_id())
        .collect::<Vec<_>>()
        .join(", ")
}
