//! Climate model
//!
//! Climate-facing modes, actions, fan and swing settings, and their mapping
//! onto the settings understood by the indoor unit.

pub mod call;
pub mod fan;
pub mod mode;
pub mod vane;

pub use call::ClimateCall;
pub use fan::{FanMode, FanSpeed};
pub use mode::{Action, DeviceMode, Mode, ModeProfile, MODE_TABLE};
pub use vane::{HorizontalVane, SwingMode, VerticalVane};
