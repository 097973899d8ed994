//! Wide tabular export of participation stats.
//!
//! One row per user with their directory details followed by a
//! contributed/received column pair for every cycle, oldest first.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::foundation::Username;
use crate::domain::profile::Profile;

use super::StatsDashboard;

const USER_COLUMNS: [&str; 8] = [
    "username",
    "display_name",
    "email",
    "business_unit",
    "location",
    "manager",
    "line_manager_name",
    "line_manager_email",
];

/// Header plus string cells, ready for any tabular writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsExport {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StatsExport {
    /// Pivots a dashboard wide. Managers are looked up in `profiles` too.
    pub fn from_dashboard(dashboard: &StatsDashboard, profiles: &HashMap<Username, Profile>) -> Self {
        let mut header: Vec<String> = USER_COLUMNS.iter().map(|c| c.to_string()).collect();
        for name in &dashboard.cycles {
            header.push(format!("{}_contributed", name));
            header.push(format!("{}_received", name));
        }

        let rows = dashboard
            .rows
            .iter()
            .map(|row| {
                let profile = profiles.get(&row.username);
                let manager = profile
                    .and_then(|p| p.manager_username.as_ref())
                    .and_then(|m| profiles.get(m));
                let text = |value: Option<&str>| value.unwrap_or_default().to_string();

                let mut cells = vec![
                    row.username.to_string(),
                    row.display_name.clone(),
                    text(profile.and_then(|p| p.email.as_deref())),
                    text(profile.and_then(|p| p.business_unit.as_deref())),
                    text(profile.and_then(|p| p.location.as_deref())),
                    profile
                        .and_then(|p| p.manager_username.as_ref())
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    text(manager.map(|m| m.display_name.as_str())),
                    text(manager.and_then(|m| m.email.as_deref())),
                ];
                for counts in &row.per_cycle {
                    cells.push(counts.contributed.to_string());
                    cells.push(counts.received.to_string());
                }
                cells
            })
            .collect();

        Self { header, rows }
    }
}
