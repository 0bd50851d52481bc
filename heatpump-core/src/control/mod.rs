//! Closed-loop control primitives
//!
//! The PID controller producing the corrected setpoint and the throttle
//! that rate-limits power transitions issued by the workflow.

pub(crate) mod math;
pub mod pid;
pub mod throttle;

pub use pid::PidController;
pub use throttle::{ActuationThrottle, Actuation};
