//! Form repository port.
//!
//! Every form write for a recipient runs the existing-summary check inside
//! the write transaction. A partial unique index on summaries backs it.

use async_trait::async_trait;

use crate::domain::feedback::Form;
use crate::domain::foundation::{CycleId, DomainError, Username};

/// Repository port for forms and their answers.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// The contribution `from` wrote about `to`, if any.
    async fn find_contribution(
        &self,
        cycle_id: &CycleId,
        from: &Username,
        to: &Username,
    ) -> Result<Option<Form>, DomainError>;

    /// The summary for `to`, if any.
    async fn find_summary(&self, cycle_id: &CycleId, to: &Username) -> Result<Option<Form>, DomainError>;

    /// Every contribution addressed to `to`.
    async fn list_contributions_to(&self, cycle_id: &CycleId, to: &Username) -> Result<Vec<Form>, DomainError>;

    /// Recipients that hold a summary.
    async fn list_summary_recipients(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError>;

    /// Insert a form with all its answers atomically.
    ///
    /// # Errors
    ///
    /// - `SummaryExists` if another summary exists for the recipient
    /// - `FormAlreadyExists` if the author already has a contribution for the recipient
    /// - `DatabaseError` on persistence failure
    async fn create(&self, form: &Form) -> Result<(), DomainError>;

    /// Overwrite answer contents of an existing form.
    ///
    /// # Errors
    ///
    /// - `FormNotFound` if the form doesn't exist
    /// - `SummaryExists` if another summary exists for the recipient
    /// - `DatabaseError` on persistence failure
    async fn update_answers(&self, form: &Form) -> Result<(), DomainError>;
}
