//! Error values shared by the domain model and the ports.
//!
//! [`ValidationError`] comes out of value-object constructors.
//! [`DomainError`] is what aggregates and adapters return: an [`ErrorCode`]
//! plus a human message and keyed details such as the offending field or
//! the name of a clashing cycle.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Rejected input to a value-object constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } | ValidationError::InvalidFormat { field, .. } => {
                field
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }
}

/// Stable, machine-readable failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    CycleNotFound,
    TemplateNotFound,
    FormNotFound,
    UserNotFound,

    CycleOverlap,
    DuplicateCycleName,
    AlreadyEnrolled,
    SummaryExists,
    FormAlreadyExists,

    PhaseMismatch,
    NoCurrentCycle,

    DatabaseError,
    NotifierError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::CycleNotFound => "CYCLE_NOT_FOUND",
            ErrorCode::TemplateNotFound => "TEMPLATE_NOT_FOUND",
            ErrorCode::FormNotFound => "FORM_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::CycleOverlap => "CYCLE_OVERLAP",
            ErrorCode::DuplicateCycleName => "DUPLICATE_CYCLE_NAME",
            ErrorCode::AlreadyEnrolled => "ALREADY_ENROLLED",
            ErrorCode::SummaryExists => "SUMMARY_EXISTS",
            ErrorCode::FormAlreadyExists => "FORM_ALREADY_EXISTS",
            ErrorCode::PhaseMismatch => "PHASE_MISMATCH",
            ErrorCode::NoCurrentCycle => "NO_CURRENT_CYCLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::NotifierError => "NOTIFIER_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Races or duplicates against stored state.
    pub fn is_conflict(self) -> bool {
        matches!(
            self,
            ErrorCode::CycleOverlap
                | ErrorCode::DuplicateCycleName
                | ErrorCode::AlreadyEnrolled
                | ErrorCode::SummaryExists
                | ErrorCode::FormAlreadyExists
        )
    }

    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            ErrorCode::CycleNotFound
                | ErrorCode::TemplateNotFound
                | ErrorCode::FormNotFound
                | ErrorCode::UserNotFound
        )
    }

    /// Bad caller input, reported against a field.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coded failure with keyed details.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    details: BTreeMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// `ValidationFailed` against `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::new(err.code(), err.to_string()).with_detail("field", field)
    }
}
