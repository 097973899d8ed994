//! Stats module - participation facts and their dashboard/export layouts.

mod dashboard;
mod export;
mod row;

pub use dashboard::{CurrentCycle, CycleCounts, DashboardRow, StatsDashboard, SummaryButtonState};
pub use export::StatsExport;
pub use row::{ParticipationFacts, StatsRow, NOT_ENROLLED};
