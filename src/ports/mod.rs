//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `CycleRepository` - Cycles, with the overlap check inside the write
//! - `TemplateRepository` - Ordered question templates
//! - `BroadcastLedger` - Compare-and-set on broadcast timestamps
//! - `EnrollmentRepository` - Enrollments and external invites
//! - `FormRepository` - Forms and answers, with the summary check inside the write
//! - `StatsReader` - Participation aggregates (read side)
//!
//! ## Collaborator Ports
//!
//! - `Directory` - Profile lookup
//! - `Notifier` - Outbound message delivery

mod broadcast_ledger;
mod cycle_repository;
mod directory;
mod enrollment_repository;
mod form_repository;
mod notifier;
mod stats_reader;
mod template_repository;

pub use broadcast_ledger::BroadcastLedger;
pub use cycle_repository::CycleRepository;
pub use directory::Directory;
pub use enrollment_repository::EnrollmentRepository;
pub use form_repository::FormRepository;
pub use notifier::{Notification, Notifier};
pub use stats_reader::StatsReader;
pub use template_repository::TemplateRepository;
