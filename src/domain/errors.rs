//! Feedback-cycle error type surfaced by every application handler.
//!
//! Ports speak [`DomainError`]; handlers translate into [`FeedbackError`] so
//! callers can branch on the category without parsing codes.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Configuration | 500 |
//! | PhaseMismatch | 409 |
//! | Conflict | 409 |
//! | ValidationFailed | 400 |
//! | NotFound | 404 |
//! | Infrastructure | 500 |

use crate::domain::cycle::Phase;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Feedback-cycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// No cycle could be selected, or stored data is unusable.
    Configuration(String),

    /// The operation is not available in the cycle's current phase.
    PhaseMismatch {
        operation: String,
        expected: Phase,
        actual: Phase,
        /// Human-readable boundary, already localised for the caller.
        boundary: String,
    },

    /// A write raced or duplicated stored state.
    Conflict { code: ErrorCode, message: String },

    /// Input failed validation.
    ValidationFailed { field: String, message: String },

    /// A referenced record or user does not exist.
    NotFound { code: ErrorCode, message: String },

    /// Storage or delivery failure.
    Infrastructure(String),
}

impl FeedbackError {
    pub fn configuration(message: impl Into<String>) -> Self {
        FeedbackError::Configuration(message.into())
    }

    pub fn phase_mismatch(
        operation: impl Into<String>,
        expected: Phase,
        actual: Phase,
        boundary: impl Into<String>,
    ) -> Self {
        FeedbackError::PhaseMismatch {
            operation: operation.into(),
            expected,
            actual,
            boundary: boundary.into(),
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        FeedbackError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        FeedbackError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        FeedbackError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        FeedbackError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            FeedbackError::Configuration(_) => ErrorCode::NoCurrentCycle,
            FeedbackError::PhaseMismatch { .. } => ErrorCode::PhaseMismatch,
            FeedbackError::Conflict { code, .. } => *code,
            FeedbackError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            FeedbackError::NotFound { code, .. } => *code,
            FeedbackError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            FeedbackError::Configuration(msg) => format!("Configuration error: {}", msg),
            FeedbackError::PhaseMismatch {
                operation,
                expected,
                actual,
                boundary,
            } => format!(
                "Cannot {} during the {} phase; only possible during {} ({})",
                operation, actual, expected, boundary
            ),
            FeedbackError::Conflict { message, .. } => message.clone(),
            FeedbackError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            FeedbackError::NotFound { message, .. } => message.clone(),
            FeedbackError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// HTTP status an outer surface should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            FeedbackError::Configuration(_) | FeedbackError::Infrastructure(_) => 500,
            FeedbackError::PhaseMismatch { .. } | FeedbackError::Conflict { .. } => 409,
            FeedbackError::ValidationFailed { .. } => 400,
            FeedbackError::NotFound { .. } => 404,
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedbackError::Infrastructure(_))
    }
}

impl std::fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FeedbackError {}

impl From<DomainError> for FeedbackError {
    fn from(err: DomainError) -> Self {
        match err.code {
            code if code.is_conflict() => FeedbackError::Conflict {
                code,
                message: err.message,
            },
            code if code.is_not_found() => FeedbackError::NotFound {
                code,
                message: err.message,
            },
            code if code.is_validation() => FeedbackError::ValidationFailed {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            ErrorCode::NoCurrentCycle => FeedbackError::Configuration(err.message),
            _ => FeedbackError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for FeedbackError {
    fn from(err: ValidationError) -> Self {
        FeedbackError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<FeedbackError> for DomainError {
    fn from(err: FeedbackError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
