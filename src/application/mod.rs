//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Cycle administration
    CreateCycleCommand, CreateCycleHandler, CreateCycleResult,
    UpdateCycleBoundariesCommand, UpdateCycleBoundariesHandler, UpdateCycleBoundariesResult,
    CyclePhase, PhaseService,
    // Enrollment
    EnrollCommand, EnrollHandler, EnrollResult,
    InviteReviewerCommand, InviteReviewerHandler, InviteReviewerResult,
    // Contributions
    GetFeedbackFormHandler, GetFeedbackFormQuery, GetFeedbackFormResult,
    GetFeedbackHistoryHandler, GetFeedbackHistoryQuery, GetFeedbackHistoryResult,
    SubmitFeedbackCommand, SubmitFeedbackHandler, SubmitFeedbackResult,
    // Summaries
    GetSummaryHandler, GetSummaryQuery, GetSummaryResult,
    SubmitSummaryCommand, SubmitSummaryHandler, SubmitSummaryResult,
    // Stats
    BuildStatsHandler, BuildStatsQuery, BuildStatsResult, StatsScope,
    // Notifications
    CheckAndSendCommand, CheckAndSendHandler, CheckAndSendOutcome, NotificationSettings,
    SkipReason,
};
