//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod cycle;
pub mod enrollment;
pub mod feedback;
pub mod notification;
pub mod stats;
pub mod summary;

pub(crate) mod lookup;

#[cfg(test)]
pub mod test_support;

pub use cycle::{
    CreateCycleCommand, CreateCycleHandler, CreateCycleResult, CyclePhase, PhaseService,
    UpdateCycleBoundariesCommand, UpdateCycleBoundariesHandler, UpdateCycleBoundariesResult,
};
pub use enrollment::{
    EnrollCommand, EnrollHandler, EnrollResult, InviteReviewerCommand, InviteReviewerHandler,
    InviteReviewerResult,
};
pub use feedback::{
    GetFeedbackFormHandler, GetFeedbackFormQuery, GetFeedbackFormResult,
    GetFeedbackHistoryHandler, GetFeedbackHistoryQuery, GetFeedbackHistoryResult,
    SubmitFeedbackCommand, SubmitFeedbackHandler, SubmitFeedbackResult,
};
pub use notification::{
    CheckAndSendCommand, CheckAndSendHandler, CheckAndSendOutcome, NotificationSettings,
    SkipReason,
};
pub use stats::{BuildStatsHandler, BuildStatsQuery, BuildStatsResult, StatsScope};
pub use summary::{
    GetSummaryHandler, GetSummaryQuery, GetSummaryResult, SubmitSummaryCommand,
    SubmitSummaryHandler, SubmitSummaryResult,
};
