//! Workflow engine
//!
//! Runs once per polling tick: keeps the PID target on the climate target,
//! computes the corrected setpoint and decides whether the unit should be
//! powered on or off.

pub mod engine;
pub mod policy;

pub use engine::{TickOutcome, WorkflowEngine};
pub use policy::{decide, Decision, OffReason, PolicyInput};
