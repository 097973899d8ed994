//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, validation hook)
//! - `cycle` - Cycle aggregate, phase clock, timezones, overlap and selection rules
//! - `enrollment` - Self-enrollment and external reviewer invites
//! - `feedback` - Forms, submission rules, contribution pooling and history
//! - `stats` - Participation facts, dashboard and export layouts
//! - `notification` - Broadcast codes and the per-cycle send ledger
//! - `profile` - Directory profile of a person
//! - `errors` - Error type surfaced by application handlers

pub mod cycle;
pub mod enrollment;
pub mod errors;
pub mod feedback;
pub mod foundation;
pub mod notification;
pub mod profile;
pub mod stats;
