//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresCycleRepository` - Cycles, overlap-checked under a table lock
//! - `PostgresTemplateRepository` - Question templates and their ordering
//! - `PostgresBroadcastLedger` - Compare-and-set on the last-sent columns
//! - `PostgresEnrollmentRepository` - Enrollments and external invites
//! - `PostgresFormRepository` - Forms and answers, summary-checked per write
//! - `PostgresStatsReader` - Participation cross product
//! - `PostgresDirectory` - Profiles from the `users` table

mod broadcast_ledger;
mod cycle_repository;
mod directory;
mod enrollment_repository;
mod form_repository;
mod stats_reader;
mod template_repository;

pub use broadcast_ledger::PostgresBroadcastLedger;
pub use cycle_repository::PostgresCycleRepository;
pub use directory::PostgresDirectory;
pub use enrollment_repository::PostgresEnrollmentRepository;
pub use form_repository::PostgresFormRepository;
pub use stats_reader::PostgresStatsReader;
pub use template_repository::PostgresTemplateRepository;

use crate::domain::foundation::{DomainError, ErrorCode, Username};

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", action, e))
}

fn parse_username(raw: String) -> Result<Username, DomainError> {
    Username::new(raw).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid username stored: {}", e))
    })
}
