//! Candidate pipeline tracking for recruitment projects.
//!
//! The `recruitment` module carries the domain core: the interview-stage
//! state machine, the role-based permission engine, the statistics
//! aggregator, and the orchestration service tying them to the external
//! document store and notifier. `config`, `telemetry`, and `error` hold
//! the process-level plumbing shared with the API binary.

pub mod config;
pub mod error;
pub mod recruitment;
pub mod telemetry;
