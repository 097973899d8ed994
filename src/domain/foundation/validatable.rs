//! Cross-record validation hook.
//!
//! Some invariants cannot be checked from a record alone: a cycle must not
//! overlap its neighbours and a form must not compete with an existing
//! summary. Repositories load the neighbouring state inside the write
//! transaction and hand it to [`Validatable::validate`] before persisting.

use super::DomainError;

/// A record whose validity depends on surrounding stored state.
pub trait Validatable {
    /// The surrounding state the check needs.
    type Context;

    /// Returns an error describing every violated invariant.
    fn validate(&self, context: &Self::Context) -> Result<(), DomainError>;
}
