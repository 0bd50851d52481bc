//! Board-agnostic core logic for heat pump climate control
//!
//! This crate contains all control logic that does not depend on a specific
//! serial link or host framework:
//!
//! - Hardware abstraction traits (unit handle, setpoint storage)
//! - Climate modes, actions and their mapping to unit settings
//! - PID controller and rate-limited power actuation
//! - Workflow engine deciding power transitions each polling tick
//! - Per-mode setpoint memory and remote temperature sensor policy
//! - Climate controller facade tying the above together
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod climate;
pub mod config;
pub mod control;
pub mod controller;
pub mod remote;
pub mod setpoints;
pub mod traits;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ClimateState, HeatPumpController};
pub use workflow::{TickOutcome, WorkflowEngine};
