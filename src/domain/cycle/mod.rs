//! Cycle module - feedback cycle aggregate, phases and scheduling rules.
//!
//! A cycle moves through enrollment, entry, approval and review. The phase is
//! derived from the clock and the observer's location, never stored.

mod aggregate;
mod display;
mod location;
mod overlap;
mod phase;
mod selection;
mod template;

pub use aggregate::{Cycle, CycleBoundaries, CYCLE_NAME_MAX_LEN};
pub use display::{DisplayPolicy, DEFAULT_DISPLAY_FORMAT};
pub use location::{effective_instant, localize, LocationZones, DEFAULT_HOMEBASE};
pub use overlap::CycleNeighbours;
pub use phase::{Phase, PhaseClock};
pub use selection::{CycleSelection, DEFAULT_LOOKAHEAD_DAYS, DEFAULT_REVIEW_GRACE_DAYS};
pub use template::{
    Question, QuestionTemplate, CYCLE_NAME_PLACEHOLDER, DISPLAY_NAME_PLACEHOLDER,
};
