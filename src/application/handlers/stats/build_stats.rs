//! BuildStatsHandler - Query handler for the participation dashboard.
//!
//! Every requested user is paired with every cycle. Pairs without an
//! enrollment report `received = -1` so "not eligible" never reads as
//! "nobody wrote".

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::application::handlers::cycle::PhaseService;
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{Timestamp, Username};
use crate::domain::profile::Profile;
use crate::domain::stats::{CurrentCycle, StatsDashboard, StatsExport, StatsRow};
use crate::ports::{CycleRepository, Directory, StatsReader};

/// Whose participation to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsScope {
    /// Exactly these users.
    Users(Vec<Username>),
    /// Staff whose line manager is the given user.
    DirectReports(Username),
    /// Every member of staff.
    AllStaff,
}

/// Query for participation stats.
#[derive(Debug, Clone)]
pub struct BuildStatsQuery {
    pub scope: StatsScope,
    pub now: Timestamp,
}

/// Dashboard plus the profiles used to label it.
#[derive(Debug, Clone)]
pub struct BuildStatsResult {
    pub dashboard: StatsDashboard,
    profiles: HashMap<Username, Profile>,
}

impl BuildStatsResult {
    /// The dashboard pivoted wide for download.
    pub fn export(&self) -> StatsExport {
        StatsExport::from_dashboard(&self.dashboard, &self.profiles)
    }
}

/// Handler for participation stats.
pub struct BuildStatsHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    cycle_repository: Arc<dyn CycleRepository>,
    stats_reader: Arc<dyn StatsReader>,
}

impl BuildStatsHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        cycle_repository: Arc<dyn CycleRepository>,
        stats_reader: Arc<dyn StatsReader>,
    ) -> Self {
        Self {
            phases,
            directory,
            cycle_repository,
            stats_reader,
        }
    }

    pub async fn handle(&self, query: BuildStatsQuery) -> Result<BuildStatsResult, FeedbackError> {
        // 1. Who is in scope, with the profiles needed to label them
        let (usernames, profiles) = self.scope(query.scope).await?;

        // 2. Aggregates for usernames x cycles
        let cycles = self.cycle_repository.list_all().await?;
        let rows: Vec<StatsRow> = self
            .stats_reader
            .participation(&usernames)
            .await?
            .into_iter()
            .map(StatsRow::from)
            .collect();

        // 3. Summary buttons follow the current cycle, when there is one
        let current = match self.phases.current(None, query.now).await {
            Ok(current) => Some(CurrentCycle {
                id: current.cycle.id(),
                phase: current.phase,
            }),
            Err(FeedbackError::Configuration(reason)) => {
                debug!(reason = %reason, "No current cycle, summary buttons omitted");
                None
            }
            Err(e) => return Err(e),
        };

        let dashboard = StatsDashboard::build(&usernames, &cycles, rows, &profiles, current);
        Ok(BuildStatsResult { dashboard, profiles })
    }

    async fn scope(
        &self,
        scope: StatsScope,
    ) -> Result<(Vec<Username>, HashMap<Username, Profile>), FeedbackError> {
        let (usernames, mut profiles) = match scope {
            StatsScope::Users(usernames) => (usernames, HashMap::new()),
            StatsScope::DirectReports(manager) => {
                let staff = self.staff_by_username().await?;
                let reports = staff
                    .values()
                    .filter(|p| p.manager_username.as_ref() == Some(&manager))
                    .map(|p| p.username.clone())
                    .collect();
                (reports, staff)
            }
            StatsScope::AllStaff => {
                let staff = self.staff_by_username().await?;
                (staff.keys().cloned().collect(), staff)
            }
        };

        // Export columns name each user's manager, so load those as well.
        for username in &usernames {
            self.load_profile(&mut profiles, username).await?;
        }
        let managers: Vec<Username> = usernames
            .iter()
            .filter_map(|u| profiles.get(u)?.manager_username.clone())
            .collect();
        for manager in &managers {
            self.load_profile(&mut profiles, manager).await?;
        }

        let mut usernames = usernames;
        usernames.sort();
        usernames.dedup();
        Ok((usernames, profiles))
    }

    async fn load_profile(
        &self,
        profiles: &mut HashMap<Username, Profile>,
        username: &Username,
    ) -> Result<(), FeedbackError> {
        if !profiles.contains_key(username) {
            if let Some(profile) = self.directory.resolve_user(username).await? {
                profiles.insert(username.clone(), profile);
            }
        }
        Ok(())
    }

    async fn staff_by_username(&self) -> Result<HashMap<Username, Profile>, FeedbackError> {
        Ok(self
            .directory
            .list_staff()
            .await?
            .into_iter()
            .map(|p| (p.username.clone(), p))
            .collect())
    }
}
