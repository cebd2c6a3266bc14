use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body every endpoint returns on a non-ok status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element id: {0}")]
pub struct UnknownElementId(pub String);
