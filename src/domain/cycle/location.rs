//! Location to timezone resolution.
//!
//! Employees carry a free-text office location in the directory. Each known
//! location maps to an IANA zone; anything else falls back to the homebase
//! location's zone.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Location used when nothing else is configured.
pub const DEFAULT_HOMEBASE: &str = "London";

/// Lookup table from office location to timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationZones {
    zones: HashMap<String, Tz>,
    homebase: String,
    fallback: Tz,
}

impl LocationZones {
    /// Builds the standard office table with the given homebase.
    ///
    /// Fails if the homebase itself is not a known location.
    pub fn new(homebase: impl Into<String>) -> Result<Self, ValidationError> {
        let zones = standard_offices();
        let homebase = homebase.into();
        let fallback = *zones.get(&homebase).ok_or_else(|| {
            ValidationError::invalid_format(
                "homebase_location",
                format!("unknown location '{}'", homebase),
            )
        })?;
        Ok(Self {
            zones,
            homebase,
            fallback,
        })
    }

    /// Adds or replaces an office mapping.
    pub fn with_office(mut self, location: impl Into<String>, zone: Tz) -> Self {
        let location = location.into();
        if location == self.homebase {
            self.fallback = zone;
        }
        self.zones.insert(location, zone);
        self
    }

    /// Name of the homebase location.
    pub fn homebase(&self) -> &str {
        &self.homebase
    }

    /// Zone used for unknown or missing locations.
    pub fn fallback_zone(&self) -> Tz {
        self.fallback
    }

    /// Resolves a location, falling back to the homebase zone.
    pub fn resolve(&self, location: Option<&str>) -> Tz {
        match location.map(str::trim).filter(|l| !l.is_empty()) {
            Some(name) => match self.zones.get(name) {
                Some(zone) => *zone,
                None => {
                    tracing::debug!(location = name, homebase = %self.homebase, "Unknown location, using homebase zone");
                    self.fallback
                }
            },
            None => self.fallback,
        }
    }
}

impl Default for LocationZones {
    fn default() -> Self {
        let zones = standard_offices();
        Self {
            zones,
            homebase: DEFAULT_HOMEBASE.to_string(),
            fallback: chrono_tz::Europe::London,
        }
    }
}

fn standard_offices() -> HashMap<String, Tz> {
    [
        ("London", chrono_tz::Europe::London),
        ("Oxford", chrono_tz::Europe::London),
        ("GBR", chrono_tz::Europe::London),
        ("New York", chrono_tz::America::New_York),
        ("Boston", chrono_tz::US::Eastern),
        ("Shanghai", chrono_tz::Asia::Shanghai),
        ("Hong Kong", chrono_tz::Asia::Hong_Kong),
        ("Pfäffikon", chrono_tz::Europe::Zurich),
    ]
    .into_iter()
    .map(|(name, zone)| (name.to_string(), zone))
    .collect()
}

/// Reads a naive wall-clock value as local time in `zone`.
///
/// Ambiguous times (clocks going back) resolve to the later, standard-time
/// instant. Times skipped by a forward shift are read with the offset that
/// was in force just before the gap.
pub fn localize(wall: NaiveDateTime, zone: Tz) -> DateTime<Tz> {
    if let Some(single) = zone.from_local_datetime(&wall).single() {
        return single;
    }
    if let Some(later) = zone.from_local_datetime(&wall).latest() {
        return later;
    }
    let offset_secs = zone
        .offset_from_local_datetime(&(wall - Duration::hours(1)))
        .earliest()
        .map(|offset| offset.fix().local_minus_utc())
        .unwrap_or(0);
    let instant = wall - Duration::seconds(i64::from(offset_secs));
    Utc.from_utc_datetime(&instant).with_timezone(&zone)
}

/// The UTC instant at which a stored boundary takes effect in `zone`.
pub fn effective_instant(boundary: Timestamp, zone: Tz) -> Timestamp {
    Timestamp::from_datetime(localize(boundary.naive_utc(), zone).with_timezone(&Utc))
}
