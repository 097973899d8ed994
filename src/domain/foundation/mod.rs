//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, time values, the validation hook and error types
//! that form the vocabulary of feedback cycles.

mod errors;
mod ids;
mod state_machine;
mod timestamp;
mod validatable;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AnswerId, CycleId, FormId, QuestionId, TemplateId, Username, USERNAME_MAX_LEN};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use validatable::Validatable;
