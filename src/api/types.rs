//! API response types

use crate::error::{SkillError, SkillErrorKind};
use serde::{Deserialize, Serialize};

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Coarse classification of the failure
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
        }
    }
}

impl From<&SkillError> for ErrorResponse {
    fn from(err: &SkillError) -> Self {
        let kind = match err.kind() {
            SkillErrorKind::Forbidden => "forbidden",
            SkillErrorKind::Routing => "routing",
            SkillErrorKind::Internal => "internal",
        };
        Self::new(err.to_string(), kind)
    }
}
