//! User control requests

use super::{FanMode, Mode, SwingMode};

/// A user request to change the climate settings
///
/// Unset fields are left as they are.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateCall {
    pub mode: Option<Mode>,
    pub target_temperature: Option<f32>,
    pub fan_mode: Option<FanMode>,
    pub swing_mode: Option<SwingMode>,
}

impl ClimateCall {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_target_temperature(mut self, target_c: f32) -> Self {
        self.target_temperature = Some(target_c);
        self
    }

    pub fn with_fan_mode(mut self, fan_mode: FanMode) -> Self {
        self.fan_mode = Some(fan_mode);
        self
    }

    pub fn with_swing_mode(mut self, swing_mode: SwingMode) -> Self {
        self.swing_mode = Some(swing_mode);
        self
    }

    /// Check if the request changes nothing
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.target_temperature.is_none()
            && self.fan_mode.is_none()
            && self.swing_mode.is_none()
    }
}
