//! Feedback Cycles - Recurring peer-feedback rounds
//!
//! Staff enrol in a cycle, colleagues and invited reviewers contribute
//! answers, managers summarise them and recipients review the result. Each
//! cycle moves through fixed phases derived from its boundaries and the
//! viewer's location.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
