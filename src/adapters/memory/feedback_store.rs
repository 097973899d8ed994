//! In-memory implementation of the persistence ports.
//!
//! All state lives behind a single `RwLock`, so every write (cycle overlap
//! check, summary check, broadcast claim) is checked and applied under one
//! exclusive lock. Useful for tests and single-process demos; nothing is
//! persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::cycle::{Cycle, CycleNeighbours, QuestionTemplate};
use crate::domain::enrollment::{Enrollment, ExternalInvite, InviteOutcome};
use crate::domain::feedback::{ExistingSummary, Form};
use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, FormId, TemplateId, Timestamp, Username, Validatable,
};
use crate::domain::notification::{ClaimOutcome, MessageCode};
use crate::domain::stats::ParticipationFacts;
use crate::ports::{
    BroadcastLedger, CycleRepository, EnrollmentRepository, FormRepository, StatsReader,
    TemplateRepository,
};

#[derive(Default)]
struct State {
    cycles: HashMap<CycleId, Cycle>,
    templates: HashMap<TemplateId, QuestionTemplate>,
    enrollments: HashMap<(CycleId, Username), Enrollment>,
    invites: HashMap<(CycleId, Username, Username), ExternalInvite>,
    forms: HashMap<FormId, Form>,
}

impl State {
    fn check_name_free(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let taken = self
            .cycles
            .values()
            .any(|c| c.id() != cycle.id() && c.name() == cycle.name());
        if taken {
            return Err(DomainError::new(
                ErrorCode::DuplicateCycleName,
                format!("A cycle named {} already exists", cycle.name()),
            ));
        }
        Ok(())
    }

    fn check_overlap(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let neighbours = CycleNeighbours::locate(cycle, self.cycles.values());
        cycle.validate(&neighbours)
    }

    fn summary_for(&self, cycle_id: CycleId, to: &Username) -> Option<&Form> {
        self.forms
            .values()
            .find(|f| f.is_summary() && f.cycle_id() == cycle_id && f.to_username() == to)
    }

    fn contribution(&self, cycle_id: CycleId, from: &Username, to: &Username) -> Option<&Form> {
        self.forms.values().find(|f| {
            !f.is_summary()
                && f.cycle_id() == cycle_id
                && f.from_username() == from
                && f.to_username() == to
        })
    }

    fn check_summary(&self, form: &Form) -> Result<(), DomainError> {
        let existing = self
            .summary_for(form.cycle_id(), form.to_username())
            .map(ExistingSummary::from);
        form.validate(&existing)
    }
}

/// Shared in-memory store backing every persistence port.
///
/// Cloning is cheap and clones share state.
#[derive(Clone, Default)]
pub struct InMemoryFeedbackStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored forms, summaries included.
    pub async fn form_count(&self) -> usize {
        self.state.read().await.forms.len()
    }
}

#[async_trait]
impl CycleRepository for InMemoryFeedbackStore {
    async fn save(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.check_name_free(cycle)?;
        state.check_overlap(cycle)?;
        state.cycles.insert(cycle.id(), cycle.clone());
        Ok(())
    }

    async fn update(&self, cycle: &Cycle) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let broadcasts = match state.cycles.get(&cycle.id()) {
            Some(stored) => *stored.broadcasts(),
            None => {
                return Err(DomainError::new(
                    ErrorCode::CycleNotFound,
                    format!("Cycle not found: {}", cycle.id()),
                ))
            }
        };
        state.check_name_free(cycle)?;
        state.check_overlap(cycle)?;

        // The ledger owns the broadcast columns; a reschedule never rewinds them.
        let updated = Cycle::reconstitute(
            cycle.id(),
            cycle.name().to_string(),
            cycle.template_id(),
            *cycle.boundaries(),
            broadcasts,
        );
        state.cycles.insert(cycle.id(), updated);
        Ok(())
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<Cycle>, DomainError> {
        Ok(self.state.read().await.cycles.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Cycle>, DomainError> {
        let state = self.state.read().await;
        let mut cycles: Vec<Cycle> = state.cycles.values().cloned().collect();
        cycles.sort_by_key(|c| c.boundaries().enroll_start());
        Ok(cycles)
    }

    async fn list_enrolling_before(&self, horizon: Timestamp) -> Result<Vec<Cycle>, DomainError> {
        let state = self.state.read().await;
        let mut cycles: Vec<Cycle> = state
            .cycles
            .values()
            .filter(|c| c.boundaries().enroll_start() < horizon)
            .cloned()
            .collect();
        cycles.sort_by_key(|c| std::cmp::Reverse(c.boundaries().enroll_start()));
        Ok(cycles)
    }
}

#[async_trait]
impl TemplateRepository for InMemoryFeedbackStore {
    async fn save(&self, template: &QuestionTemplate) -> Result<(), DomainError> {
        self.state
            .write()
            .await
            .templates
            .insert(template.id(), template.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<QuestionTemplate>, DomainError> {
        Ok(self.state.read().await.templates.get(id).cloned())
    }
}

#[async_trait]
impl BroadcastLedger for InMemoryFeedbackStore {
    async fn claim(
        &self,
        cycle_id: &CycleId,
        code: MessageCode,
        at: Timestamp,
        force: bool,
    ) -> Result<ClaimOutcome, DomainError> {
        let mut state = self.state.write().await;
        let cycle = state.cycles.get_mut(cycle_id).ok_or_else(|| {
            DomainError::new(ErrorCode::CycleNotFound, format!("Cycle not found: {}", cycle_id))
        })?;
        Ok(cycle.claim_broadcast(code, at, force))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryFeedbackStore {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.cycles.contains_key(&enrollment.cycle_id) {
            return Err(DomainError::new(
                ErrorCode::CycleNotFound,
                format!("Cycle not found: {}", enrollment.cycle_id),
            ));
        }
        let key = (enrollment.cycle_id, enrollment.username.clone());
        if state.enrollments.contains_key(&key) {
            return Err(DomainError::new(
                ErrorCode::AlreadyEnrolled,
                format!(
                    "{} is already enrolled in cycle {}",
                    enrollment.username, enrollment.cycle_id
                ),
            ));
        }
        state.enrollments.insert(key, enrollment.clone());
        Ok(())
    }

    async fn is_enrolled(&self, cycle_id: &CycleId, username: &Username) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.enrollments.contains_key(&(*cycle_id, username.clone())))
    }

    async fn list_enrolled(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError> {
        let state = self.state.read().await;
        let mut usernames: Vec<Username> = state
            .enrollments
            .values()
            .filter(|e| e.cycle_id == *cycle_id)
            .map(|e| e.username.clone())
            .collect();
        usernames.sort();
        Ok(usernames)
    }

    async fn invite(&self, invite: &ExternalInvite) -> Result<InviteOutcome, DomainError> {
        let mut state = self.state.write().await;
        let key = (invite.cycle_id, invite.inviter.clone(), invite.invitee.clone());
        if state.invites.contains_key(&key) {
            return Ok(InviteOutcome::AlreadyInvited);
        }
        state.invites.insert(key, invite.clone());
        Ok(InviteOutcome::Created)
    }

    async fn is_invited(
        &self,
        cycle_id: &CycleId,
        inviter: &Username,
        invitee: &Username,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .invites
            .contains_key(&(*cycle_id, inviter.clone(), invitee.clone())))
    }

    async fn list_inviters(&self, cycle_id: &CycleId, invitee: &Username) -> Result<Vec<Username>, DomainError> {
        let state = self.state.read().await;
        let mut inviters: Vec<Username> = state
            .invites
            .values()
            .filter(|i| i.cycle_id == *cycle_id && &i.invitee == invitee)
            .map(|i| i.inviter.clone())
            .collect();
        inviters.sort();
        Ok(inviters)
    }
}

#[async_trait]
impl FormRepository for InMemoryFeedbackStore {
    async fn find_contribution(
        &self,
        cycle_id: &CycleId,
        from: &Username,
        to: &Username,
    ) -> Result<Option<Form>, DomainError> {
        let state = self.state.read().await;
        Ok(state.contribution(*cycle_id, from, to).cloned())
    }

    async fn find_summary(&self, cycle_id: &CycleId, to: &Username) -> Result<Option<Form>, DomainError> {
        let state = self.state.read().await;
        Ok(state.summary_for(*cycle_id, to).cloned())
    }

    async fn list_contributions_to(&self, cycle_id: &CycleId, to: &Username) -> Result<Vec<Form>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .forms
            .values()
            .filter(|f| !f.is_summary() && f.cycle_id() == *cycle_id && f.to_username() == to)
            .cloned()
            .collect())
    }

    async fn list_summary_recipients(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError> {
        let state = self.state.read().await;
        let mut recipients: Vec<Username> = state
            .forms
            .values()
            .filter(|f| f.is_summary() && f.cycle_id() == *cycle_id)
            .map(|f| f.to_username().clone())
            .collect();
        recipients.sort();
        Ok(recipients)
    }

    async fn create(&self, form: &Form) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.check_summary(form)?;
        if !form.is_summary()
            && state
                .contribution(form.cycle_id(), form.from_username(), form.to_username())
                .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::FormAlreadyExists,
                format!(
                    "{} already has feedback for {} in cycle {}",
                    form.from_username(),
                    form.to_username(),
                    form.cycle_id()
                ),
            ));
        }
        state.forms.insert(form.id(), form.clone());
        Ok(())
    }

    async fn update_answers(&self, form: &Form) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.forms.contains_key(&form.id()) {
            return Err(DomainError::new(
                ErrorCode::FormNotFound,
                format!("Form not found: {}", form.id()),
            ));
        }
        state.check_summary(form)?;
        state.forms.insert(form.id(), form.clone());
        Ok(())
    }
}

#[async_trait]
impl StatsReader for InMemoryFeedbackStore {
    async fn participation(&self, usernames: &[Username]) -> Result<Vec<ParticipationFacts>, DomainError> {
        let state = self.state.read().await;
        let mut cycles: Vec<&Cycle> = state.cycles.values().collect();
        cycles.sort_by_key(|c| c.boundaries().enroll_start());

        let mut facts = Vec::with_capacity(usernames.len() * cycles.len());
        for username in usernames {
            for cycle in &cycles {
                let in_cycle = || state.forms.values().filter(|f| f.cycle_id() == cycle.id());
                facts.push(ParticipationFacts {
                    username: username.clone(),
                    cycle_id: cycle.id(),
                    cycle_name: cycle.name().to_string(),
                    enroll_start: cycle.boundaries().enroll_start(),
                    contributed: in_cycle()
                        .filter(|f| !f.is_summary() && f.from_username() == username)
                        .count() as i64,
                    received: in_cycle()
                        .filter(|f| !f.is_summary() && f.to_username() == username)
                        .count() as i64,
                    enrolled: state
                        .enrollments
                        .contains_key(&(cycle.id(), username.clone())),
                    has_summary: in_cycle().any(|f| f.is_summary() && f.to_username() == username),
                });
            }
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{CycleBoundaries, Question};
    use crate::domain::feedback::Answer;
    use chrono::{TimeZone, Utc};

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn ts(month: u32, day: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, month, day, 18, 0, 0).unwrap())
    }

    fn cycle(name: &str, start_month: u32) -> Cycle {
        let b = CycleBoundaries::new(
            ts(start_month, 1),
            ts(start_month, 8),
            ts(start_month, 15),
            ts(start_month, 22),
        )
        .unwrap();
        Cycle::new(name, TemplateId::new(), b).unwrap()
    }

    fn contribution(cycle: &Cycle, from: &str, to: &str) -> Form {
        Form::new(
            cycle.id(),
            user(from),
            user(to),
            false,
            vec![Answer::new(crate::domain::foundation::QuestionId::new(), "great")],
        )
        .unwrap()
    }

    fn summary(cycle: &Cycle, from: &str, to: &str) -> Form {
        Form::new(cycle.id(), user(from), user(to), true, vec![]).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════
    // Cycles
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn save_rejects_overlapping_cycle() {
        let store = InMemoryFeedbackStore::new();
        CycleRepository::save(&store, &cycle("march", 3)).await.unwrap();

        let b = CycleBoundaries::new(ts(3, 20), ts(4, 1), ts(4, 8), ts(4, 15)).unwrap();
        let clash = Cycle::new("april", TemplateId::new(), b).unwrap();
        let err = CycleRepository::save(&store, &clash).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CycleOverlap);
        assert_eq!(err.detail("previous_cycle"), Some("march"));
    }

    #[tokio::test]
    async fn save_rejects_cycle_ending_with_an_existing_one() {
        let store = InMemoryFeedbackStore::new();
        CycleRepository::save(&store, &cycle("march", 3)).await.unwrap();

        let b = CycleBoundaries::new(ts(3, 5), ts(3, 10), ts(3, 15), ts(3, 22)).unwrap();
        let twin = Cycle::new("march-b", TemplateId::new(), b).unwrap();
        let err = CycleRepository::save(&store, &twin).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CycleOverlap);
        assert_eq!(err.detail("previous_cycle"), Some("march"));
    }

    #[tokio::test]
    async fn save_rejects_duplicate_name() {
        let store = InMemoryFeedbackStore::new();
        CycleRepository::save(&store, &cycle("h1", 3)).await.unwrap();

        let err = CycleRepository::save(&store, &cycle("h1", 6)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateCycleName);
    }

    #[tokio::test]
    async fn update_keeps_broadcast_log() {
        let store = InMemoryFeedbackStore::new();
        let mut c = cycle("march", 3);
        CycleRepository::save(&store, &c).await.unwrap();
        store
            .claim(&c.id(), MessageCode::EnrolStart, ts(3, 1), false)
            .await
            .unwrap();

        let later = CycleBoundaries::new(ts(3, 2), ts(3, 9), ts(3, 16), ts(3, 23)).unwrap();
        c.reschedule(later);
        store.update(&c).await.unwrap();

        let stored = CycleRepository::find_by_id(&store, &c.id()).await.unwrap().unwrap();
        assert_eq!(stored.boundaries().enroll_start(), ts(3, 2));
        assert_eq!(stored.broadcasts().last_sent(MessageCode::EnrolStart), Some(ts(3, 1)));
    }

    #[tokio::test]
    async fn update_of_unknown_cycle_is_not_found() {
        let store = InMemoryFeedbackStore::new();
        let err = store.update(&cycle("ghost", 3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleNotFound);
    }

    #[tokio::test]
    async fn enrolling_before_lists_newest_first() {
        let store = InMemoryFeedbackStore::new();
        CycleRepository::save(&store, &cycle("march", 3)).await.unwrap();
        CycleRepository::save(&store, &cycle("may", 5)).await.unwrap();
        CycleRepository::save(&store, &cycle("sept", 9)).await.unwrap();

        let listed = store.list_enrolling_before(ts(6, 1)).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["may", "march"]);
    }

    // ═══════════════════════════════════════════════════════════════
    // Templates and broadcasts
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn template_round_trips() {
        let store = InMemoryFeedbackStore::new();
        let template =
            QuestionTemplate::new(TemplateId::new(), vec![Question::new("Strengths", "What went well?")])
                .unwrap();
        TemplateRepository::save(&store, &template).await.unwrap();

        let found = TemplateRepository::find_by_id(&store, &template.id()).await.unwrap();
        assert_eq!(found, Some(template));
    }

    #[tokio::test]
    async fn second_claim_without_force_reports_first_send() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        CycleRepository::save(&store, &c).await.unwrap();

        let first = store
            .claim(&c.id(), MessageCode::EntryStart, ts(3, 8), false)
            .await
            .unwrap();
        let second = store
            .claim(&c.id(), MessageCode::EntryStart, ts(3, 9), false)
            .await
            .unwrap();

        assert_eq!(first, ClaimOutcome::Claimed { previous: None });
        assert_eq!(second, ClaimOutcome::AlreadySent { at: ts(3, 8) });
    }

    #[tokio::test]
    async fn claim_on_unknown_cycle_is_not_found() {
        let store = InMemoryFeedbackStore::new();
        let err = store
            .claim(&CycleId::new(), MessageCode::EntryStart, ts(3, 8), false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleNotFound);
    }

    // ═══════════════════════════════════════════════════════════════
    // Enrollment
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn enrolling_twice_conflicts() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        CycleRepository::save(&store, &c).await.unwrap();
        let enrollment = Enrollment::new(c.id(), user("amy"), ts(3, 2));

        store.enroll(&enrollment).await.unwrap();
        let err = store.enroll(&enrollment).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyEnrolled);
        assert!(store.is_enrolled(&c.id(), &user("amy")).await.unwrap());
        assert_eq!(store.list_enrolled(&c.id()).await.unwrap(), vec![user("amy")]);
    }

    #[tokio::test]
    async fn invites_are_idempotent() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        let invite = ExternalInvite::new(c.id(), user("amy"), user("ext"), ts(3, 9)).unwrap();

        assert_eq!(store.invite(&invite).await.unwrap(), InviteOutcome::Created);
        assert_eq!(store.invite(&invite).await.unwrap(), InviteOutcome::AlreadyInvited);
        assert!(store.is_invited(&c.id(), &user("amy"), &user("ext")).await.unwrap());
        assert_eq!(
            store.list_inviters(&c.id(), &user("ext")).await.unwrap(),
            vec![user("amy")]
        );
    }

    // ═══════════════════════════════════════════════════════════════
    // Forms
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn second_summary_for_recipient_is_refused() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        store.create(&summary(&c, "boss", "amy")).await.unwrap();

        let err = store.create(&summary(&c, "other", "amy")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SummaryExists);
        assert_eq!(err.detail("author"), Some("boss"));
    }

    #[tokio::test]
    async fn racing_first_summaries_leave_one() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);

        let writers: Vec<_> = ["boss", "other", "third"]
            .into_iter()
            .map(|author| {
                let store = store.clone();
                let form = summary(&c, author, "amy");
                tokio::spawn(async move { store.create(&form).await })
            })
            .collect();
        let mut written = 0;
        for writer in writers {
            match writer.await.unwrap() {
                Ok(()) => written += 1,
                Err(e) => assert_eq!(e.code, ErrorCode::SummaryExists),
            }
        }

        assert_eq!(written, 1);
        assert_eq!(store.list_summary_recipients(&c.id()).await.unwrap(), vec![user("amy")]);
    }

    #[tokio::test]
    async fn contribution_after_summary_is_refused() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        store.create(&summary(&c, "boss", "amy")).await.unwrap();

        let err = store.create(&contribution(&c, "zed", "amy")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SummaryExists);
    }

    #[tokio::test]
    async fn summary_author_can_rewrite_own_summary() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        let s = summary(&c, "boss", "amy");
        store.create(&s).await.unwrap();

        store.update_answers(&s).await.unwrap();
        assert_eq!(store.list_summary_recipients(&c.id()).await.unwrap(), vec![user("amy")]);
    }

    #[tokio::test]
    async fn duplicate_contribution_is_refused() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        store.create(&contribution(&c, "zed", "amy")).await.unwrap();

        let err = store.create(&contribution(&c, "zed", "amy")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FormAlreadyExists);
        assert_eq!(store.form_count().await, 1);
    }

    #[tokio::test]
    async fn updating_unknown_form_is_not_found() {
        let store = InMemoryFeedbackStore::new();
        let c = cycle("march", 3);
        let err = store
            .update_answers(&contribution(&c, "zed", "amy"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FormNotFound);
    }

    // ═══════════════════════════════════════════════════════════════
    // Stats
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn participation_covers_cross_product() {
        let store = InMemoryFeedbackStore::new();
        let march = cycle("march", 3);
        let may = cycle("may", 5);
        CycleRepository::save(&store, &march).await.unwrap();
        CycleRepository::save(&store, &may).await.unwrap();
        store
            .enroll(&Enrollment::new(march.id(), user("amy"), ts(3, 2)))
            .await
            .unwrap();
        store.create(&contribution(&march, "zed", "amy")).await.unwrap();

        let facts = store.participation(&[user("amy"), user("zed")]).await.unwrap();

        assert_eq!(facts.len(), 4);
        let amy_march = &facts[0];
        assert_eq!(amy_march.cycle_name, "march");
        assert_eq!(amy_march.received, 1);
        assert!(amy_march.enrolled);
        let zed_march = &facts[2];
        assert_eq!(zed_march.contributed, 1);
        assert!(!zed_march.enrolled);
    }
}
