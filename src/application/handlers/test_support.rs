//! Shared fixture for handler tests.
//!
//! One template, one March 2024 cycle and a small directory:
//!
//! | user  | manager | unit        | e-mail |
//! |-------|---------|-------------|--------|
//! | alice | carol   | Engineering | yes    |
//! | bob   | carol   | Engineering | yes    |
//! | carol |         | Engineering | yes    |
//! | erin  | carol   | Engineering | no     |
//! | dave  |         | Partners    | yes    |
//! | tm    |         | People      | yes    |

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::adapters::memory::{InMemoryDirectory, InMemoryFeedbackStore};
use crate::adapters::notifier::RecordingNotifier;
use crate::domain::cycle::{
    Cycle, CycleBoundaries, CycleSelection, DisplayPolicy, PhaseClock, Question, QuestionTemplate,
};
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{TemplateId, Timestamp, Username};
use crate::domain::profile::Profile;
use crate::ports::{CycleRepository, EnrollmentRepository, TemplateRepository};

use super::cycle::PhaseService;
use super::notification::NotificationSettings;

pub const BUSINESS_UNIT: &str = "Engineering";

pub fn ts(m: u32, d: u32, h: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap())
}

pub fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

/// Instants inside each phase of the fixture cycle (London observer).
pub mod at {
    use super::ts;
    use crate::domain::foundation::Timestamp;

    pub fn before() -> Timestamp {
        ts(2, 25, 12)
    }

    pub fn enrollment() -> Timestamp {
        ts(3, 3, 12)
    }

    pub fn entry() -> Timestamp {
        ts(3, 10, 12)
    }

    pub fn approval() -> Timestamp {
        ts(3, 17, 12)
    }

    pub fn review() -> Timestamp {
        ts(3, 25, 12)
    }
}

pub struct Fixture {
    pub store: InMemoryFeedbackStore,
    pub directory: InMemoryDirectory,
    pub notifier: RecordingNotifier,
    pub template: QuestionTemplate,
    pub cycle: Cycle,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = InMemoryFeedbackStore::new();

        let template = QuestionTemplate::new(
            TemplateId::new(),
            vec![
                Question::new("Strengths", "What does {display_name} do well?"),
                Question::new("Growth", "What could {display_name} improve in {cycle_name}?"),
            ],
        )
        .unwrap();
        TemplateRepository::save(&store, &template).await.unwrap();

        let boundaries =
            CycleBoundaries::new(ts(3, 1, 18), ts(3, 8, 18), ts(3, 15, 18), ts(3, 22, 18)).unwrap();
        let cycle = Cycle::new("2024 Mar", template.id(), boundaries).unwrap();
        CycleRepository::save(&store, &cycle).await.unwrap();

        let staff = |name: &str, display: &str| {
            Profile::staff(user(name), display)
                .with_business_unit(BUSINESS_UNIT)
                .with_location("London")
        };
        let directory = InMemoryDirectory::with_profiles([
            staff("alice", "Alice Archer")
                .with_manager(user("carol"))
                .with_email("alice@example.com"),
            staff("bob", "Bob Baker")
                .with_manager(user("carol"))
                .with_email("bob@example.com"),
            staff("carol", "Carol Cole").with_email("carol@example.com"),
            staff("erin", "Erin Evans").with_manager(user("carol")),
            Profile {
                is_staff: false,
                ..Profile::staff(user("dave"), "Dave Dunn")
                    .with_business_unit("Partners")
                    .with_email("dave@partner.example")
            },
            Profile::staff(user("tm"), "Talent Manager")
                .with_business_unit("People")
                .with_email("tm@example.com"),
        ]);

        Self {
            store,
            directory,
            notifier: RecordingNotifier::new(),
            template,
            cycle,
        }
    }

    pub fn phase_service(&self) -> Arc<PhaseService> {
        Arc::new(PhaseService::new(
            Arc::new(self.store.clone()),
            PhaseClock::default(),
            CycleSelection::default(),
            DisplayPolicy::default(),
        ))
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            company_name: "Acme".to_string(),
            support_email: Some("help@example.com".to_string()),
            app_host: Some("https://feedback.example.com".to_string()),
            talent_managers: vec![user("tm")],
        }
    }

    pub async fn enroll(&self, name: &str) {
        let enrollment = Enrollment::new(self.cycle.id(), user(name), at::enrollment());
        self.store.enroll(&enrollment).await.unwrap();
    }
}
