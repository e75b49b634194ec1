//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
///
/// Delivery failures are intentionally absent: a failed send to one peer is
/// always local to the connection registry, which logs it and moves on.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("No active question")]
    NoActiveQuestion,

    #[error("Invalid answer: {selected:?} is not a declared option")]
    InvalidAnswer { selected: String },

    #[error("Question is locked")]
    QuestionLocked,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::QuestionNotFound(_) => "UNKNOWN_QUESTION",
            Self::NoActiveQuestion => "NO_ACTIVE_QUESTION",
            Self::InvalidAnswer { .. } => "INVALID_ANSWER",
            Self::QuestionLocked => "QUESTION_LOCKED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QuestionNotFound(_) | Self::NoActiveQuestion)
    }

    /// Check if this is a caller-correctable validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidAnswer { .. })
    }

    /// Check if this is a forbidden-state error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::QuestionLocked)
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl std::fmt::Display) -> Self {
        Self::Storage(msg.to_string())
    }
}
