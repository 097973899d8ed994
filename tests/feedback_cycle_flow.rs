//! Integration tests for a full feedback cycle.
//!
//! These tests walk one cycle end to end:
//! 1. An administrator creates the cycle from a template
//! 2. A member of staff enrols and invites an external reviewer
//! 3. Colleagues and the reviewer contribute during entry
//! 4. The manager summarises the pooled contributions during approval
//! 5. The recipient sees the summary in their history during review
//!
//! Uses the in-memory adapters so no database is required.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use feedback_cycles::adapters::{InMemoryDirectory, InMemoryFeedbackStore, RecordingNotifier};
use feedback_cycles::application::{
    BuildStatsHandler, BuildStatsQuery, CheckAndSendCommand, CheckAndSendHandler,
    CheckAndSendOutcome, CreateCycleCommand, CreateCycleHandler, EnrollCommand, EnrollHandler,
    GetFeedbackFormHandler, GetFeedbackFormQuery, GetFeedbackHistoryHandler,
    GetFeedbackHistoryQuery, GetSummaryHandler, GetSummaryQuery, InviteReviewerCommand,
    InviteReviewerHandler, NotificationSettings, PhaseService, StatsScope, SubmitFeedbackCommand,
    SubmitFeedbackHandler, SubmitSummaryCommand, SubmitSummaryHandler,
};
use feedback_cycles::domain::cycle::{
    CycleSelection, DisplayPolicy, Phase, PhaseClock, Question, QuestionTemplate,
};
use feedback_cycles::domain::errors::FeedbackError;
use feedback_cycles::domain::feedback::{AnswerInput, HistoryEntry};
use feedback_cycles::domain::foundation::{ErrorCode, TemplateId, Timestamp, Username};
use feedback_cycles::domain::notification::MessageCode;
use feedback_cycles::domain::profile::Profile;
use feedback_cycles::ports::TemplateRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

const BUSINESS_UNIT: &str = "Engineering";

fn ts(month: u32, day: u32, hour: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap())
}

fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

struct World {
    store: InMemoryFeedbackStore,
    directory: InMemoryDirectory,
    notifier: RecordingNotifier,
    phases: Arc<PhaseService>,
    template: QuestionTemplate,
}

impl World {
    async fn new() -> Self {
        let store = InMemoryFeedbackStore::new();
        let template = QuestionTemplate::new(
            TemplateId::new(),
            vec![
                Question::new("Strengths", "What does {display_name} do well?"),
                Question::new("Growth", "What could {display_name} work on?"),
            ],
        )
        .unwrap();
        store.save(&template).await.unwrap();

        let staff = |name: &str, display: &str| {
            Profile::staff(user(name), display)
                .with_business_unit(BUSINESS_UNIT)
                .with_location("London")
                .with_email(format!("{}@example.com", name))
        };
        let directory = InMemoryDirectory::with_profiles([
            staff("alice", "Alice Archer").with_manager(user("carol")),
            staff("bob", "Bob Baker").with_manager(user("carol")),
            staff("carol", "Carol Cole"),
            Profile {
                is_staff: false,
                ..Profile::staff(user("dave"), "Dave Dunn")
                    .with_business_unit("Partners")
                    .with_email("dave@partner.example")
            },
        ]);

        let phases = Arc::new(PhaseService::new(
            Arc::new(store.clone()),
            PhaseClock::default(),
            CycleSelection::default(),
            DisplayPolicy::default(),
        ));

        Self {
            store,
            directory,
            notifier: RecordingNotifier::new(),
            phases,
            template,
        }
    }

    fn settings(&self) -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            company_name: "Acme".to_string(),
            support_email: Some("help@example.com".to_string()),
            app_host: None,
            talent_managers: vec![user("carol")],
        }
    }

    fn answers(&self, strengths: &str, growth: &str) -> Vec<AnswerInput> {
        let questions = self.template.questions();
        vec![
            AnswerInput::new(questions[0].id, strengths),
            AnswerInput::new(questions[1].id, growth),
        ]
    }

    fn submit_feedback(&self) -> SubmitFeedbackHandler {
        SubmitFeedbackHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Some(BUSINESS_UNIT.to_string()),
        )
    }

    fn feedback_form(&self) -> GetFeedbackFormHandler {
        GetFeedbackFormHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Some(BUSINESS_UNIT.to_string()),
        )
    }

    fn summary(&self) -> GetSummaryHandler {
        GetSummaryHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
        )
    }

    fn submit_summary(&self) -> SubmitSummaryHandler {
        SubmitSummaryHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
        )
    }

    fn history(&self) -> GetFeedbackHistoryHandler {
        GetFeedbackHistoryHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            5,
        )
    }

    fn stats(&self) -> BuildStatsHandler {
        BuildStatsHandler::new(
            self.phases.clone(),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
        )
    }

    fn broadcasts(&self) -> CheckAndSendHandler {
        CheckAndSendHandler::new(
            self.phases.clone(),
            Arc::new(self.store.clone()),
            Arc::new(self.directory.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.notifier.clone()),
            self.settings(),
        )
    }

    async fn create_cycle(&self) {
        CreateCycleHandler::new(Arc::new(self.store.clone()), Arc::new(self.store.clone()))
            .handle(CreateCycleCommand {
                name: "2024 Mar".to_string(),
                template_id: self.template.id(),
                enroll_start: ts(3, 1, 18),
                entry_start: ts(3, 8, 18),
                approval_start: ts(3, 15, 18),
                approval_end: ts(3, 22, 18),
            })
            .await
            .unwrap();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_cycle_from_enrollment_to_review() {
    let world = World::new().await;
    world.create_cycle().await;

    // Enrollment
    let enrolled = EnrollHandler::new(
        world.phases.clone(),
        Arc::new(world.directory.clone()),
        Arc::new(world.store.clone()),
    )
    .handle(EnrollCommand {
        username: user("alice"),
        cycle_id: None,
        now: ts(3, 3, 12),
    })
    .await
    .unwrap();
    assert_eq!(enrolled.cycle_name, "2024 Mar");

    let early = world
        .submit_feedback()
        .handle(SubmitFeedbackCommand {
            from: user("bob"),
            to: user("alice"),
            answers: world.answers("Clear writer", "Say no more often"),
            now: ts(3, 5, 12),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        early,
        FeedbackError::PhaseMismatch { expected: Phase::Entry, actual: Phase::Enrollment, .. }
    ));

    // Entry
    let entry = ts(3, 10, 12);
    let form = world
        .feedback_form()
        .handle(GetFeedbackFormQuery {
            from: user("bob"),
            to: user("alice"),
            now: entry,
        })
        .await
        .unwrap();
    assert!(form.draft.is_none());
    assert_eq!(form.view.items[0].question, "What does Alice Archer do well?");

    world
        .submit_feedback()
        .handle(SubmitFeedbackCommand {
            from: user("bob"),
            to: user("alice"),
            answers: world.answers("Clear writer", "Say no more often"),
            now: entry,
        })
        .await
        .unwrap();

    let uninvited = world
        .submit_feedback()
        .handle(SubmitFeedbackCommand {
            from: user("dave"),
            to: user("alice"),
            answers: world.answers("Responsive", "Share plans earlier"),
            now: entry,
        })
        .await
        .unwrap_err();
    assert_eq!(uninvited.code(), ErrorCode::ValidationFailed);

    let invited = InviteReviewerHandler::new(
        world.phases.clone(),
        Arc::new(world.directory.clone()),
        Arc::new(world.store.clone()),
        Arc::new(world.notifier.clone()),
        world.settings(),
    )
    .handle(InviteReviewerCommand {
        inviter: user("alice"),
        invitee_email: "dave@partner.example".to_string(),
        cycle_id: None,
        now: entry,
    })
    .await
    .unwrap();
    assert!(invited.notified);

    world
        .submit_feedback()
        .handle(SubmitFeedbackCommand {
            from: user("dave"),
            to: user("alice"),
            answers: world.answers("Responsive", "Share plans earlier"),
            now: entry,
        })
        .await
        .unwrap();

    // Approval
    let approval = ts(3, 17, 12);
    let payload = world
        .summary()
        .handle(GetSummaryQuery {
            from: user("carol"),
            to: user("alice"),
            now: approval,
        })
        .await
        .unwrap();
    assert_eq!(payload.pooled_from, 2);

    world
        .submit_summary()
        .handle(SubmitSummaryCommand {
            from: user("carol"),
            to: user("alice"),
            answers: world.answers("Clear writer, responsive", "Share plans earlier"),
            now: approval,
        })
        .await
        .unwrap();

    // Review
    let review = ts(3, 25, 12);
    let history = world
        .history()
        .handle(GetFeedbackHistoryQuery {
            username: user("alice"),
            now: review,
        })
        .await
        .unwrap();
    match &history.entries[..] {
        [HistoryEntry::Available { cycle_name, items }] => {
            assert_eq!(cycle_name, "2024 Mar");
            assert_eq!(items[0].answer, "Clear writer, responsive");
            assert_eq!(items[1].question, "What could Alice Archer work on?");
        }
        other => panic!("unexpected history: {:?}", other),
    }

    let stats = world
        .stats()
        .handle(BuildStatsQuery {
            scope: StatsScope::DirectReports(user("carol")),
            now: review,
        })
        .await
        .unwrap();
    let alice = stats
        .dashboard
        .rows
        .iter()
        .find(|r| r.username == user("alice"))
        .unwrap();
    assert_eq!(alice.per_cycle[0].received, 2);
    let bob = stats
        .dashboard
        .rows
        .iter()
        .find(|r| r.username == user("bob"))
        .unwrap();
    assert_eq!(bob.per_cycle[0].contributed, 1);
    assert_eq!(bob.per_cycle[0].received, -1);

    let outcome = world
        .broadcasts()
        .handle(CheckAndSendCommand {
            cycle_id: None,
            code: None,
            force: false,
            now: review,
        })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CheckAndSendOutcome::Sent {
            cycle_name: "2024 Mar".to_string(),
            code: MessageCode::ReviewStart,
            recipients: 1,
            attempted: true,
        }
    );
}

#[tokio::test]
async fn history_before_review_is_pending() {
    let world = World::new().await;
    world.create_cycle().await;

    let history = world
        .history()
        .handle(GetFeedbackHistoryQuery {
            username: user("alice"),
            now: ts(3, 10, 12),
        })
        .await
        .unwrap();

    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.entries[0].description(), "2024 Mar pending");
    assert!(!history.entries[0].enabled());
}
