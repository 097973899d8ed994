//! Cycle command handlers and the shared phase service.

// Command handlers
mod create_cycle;
mod update_cycle_boundaries;

mod phase_service;

pub use create_cycle::{CreateCycleCommand, CreateCycleHandler, CreateCycleResult};
pub use phase_service::{CyclePhase, PhaseService};
pub use update_cycle_boundaries::{
    UpdateCycleBoundariesCommand, UpdateCycleBoundariesHandler, UpdateCycleBoundariesResult,
};
