//! Skill error types

use crate::store::StoreError;
use thiserror::Error;

/// Errors that abort a single skill invocation.
///
/// None of these are retried; the dispatcher logs them once and hands them
/// back to the hosting platform.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Invalid applicationId: expected {expected}, got {actual}")]
    InvalidApplicationId { expected: String, actual: String },
    #[error("Unroutable request type: {0}")]
    UnroutableRequestType(String),
    #[error("Unsupported intent = {0}")]
    UnsupportedIntent(String),
    #[error("IntentRequest carried no intent")]
    MissingIntent,
    #[error("Unknown stimulus name: {0}")]
    UnknownStimulusName(String),
    #[error("No applicable transform for stimulus {stimulus}")]
    NoApplicableTransform { stimulus: String },
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("{0} should be overridden by the skill")]
    HandlerOverrideMissing(&'static str),
    #[error("Session history is malformed: {0}")]
    InvalidHistory(serde_json::Error),
}

pub type SkillResult<T> = Result<T, SkillError>;

/// Error classification for the hosting surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillErrorKind {
    /// Caller is not the configured application
    Forbidden,
    /// Request could not be routed to any handler
    Routing,
    /// Skill-side failure (transforms, persistence, missing overrides)
    Internal,
}

impl SkillError {
    pub fn kind(&self) -> SkillErrorKind {
        match self {
            Self::InvalidApplicationId { .. } => SkillErrorKind::Forbidden,
            Self::UnroutableRequestType(_) | Self::UnsupportedIntent(_) | Self::MissingIntent => {
                SkillErrorKind::Routing
            }
            Self::UnknownStimulusName(_)
            | Self::NoApplicableTransform { .. }
            | Self::Persistence(_)
            | Self::HandlerOverrideMissing(_)
            | Self::InvalidHistory(_) => SkillErrorKind::Internal,
        }
    }
}
