//! Indoor unit handle

use core::fmt;

use crate::climate::{DeviceMode, FanSpeed, HorizontalVane, VerticalVane};

/// Errors reported by the unit link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Serial link not connected
    NotConnected,
    /// Unit did not confirm the update
    NotAcknowledged,
    /// No response within the link timeout
    Timeout,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotConnected => write!(f, "unit not connected"),
            DeviceError::NotAcknowledged => write!(f, "unit did not acknowledge update"),
            DeviceError::Timeout => write!(f, "unit timed out"),
        }
    }
}

/// Settings snapshot reported by the unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeatPumpSettings {
    pub power: bool,
    pub mode: DeviceMode,
    /// Setpoint (°C)
    pub temperature: f32,
    pub fan: FanSpeed,
    pub vane: VerticalVane,
    pub wide_vane: HorizontalVane,
}

/// Status snapshot reported by the unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeatPumpStatus {
    /// Room temperature seen by the unit (°C)
    pub room_temperature: f32,
    /// Compressor running
    pub operating: bool,
}

/// Trait for the indoor unit link
///
/// Setters stage a change; nothing reaches the unit until [`update`] commits
/// all staged changes at once. A failed [`update`] keeps the staged changes,
/// so callers [`discard`] them before anything else is committed. Snapshots
/// are `None` until the unit has answered at least once.
///
/// [`update`]: HeatPumpDevice::update
/// [`discard`]: HeatPumpDevice::discard
pub trait HeatPumpDevice {
    /// Latest settings snapshot
    fn settings(&self) -> Option<HeatPumpSettings>;

    /// Latest status snapshot
    fn status(&self) -> Option<HeatPumpStatus>;

    fn set_power(&mut self, on: bool);

    fn set_mode(&mut self, mode: DeviceMode);

    /// Stage a setpoint (°C)
    fn set_temperature(&mut self, temperature_c: f32);

    fn set_fan_speed(&mut self, speed: FanSpeed);

    fn set_vane(&mut self, vane: VerticalVane);

    fn set_wide_vane(&mut self, wide_vane: HorizontalVane);

    /// Send an external room temperature, 0 reverts to the internal sensor
    ///
    /// Takes effect immediately, no commit needed.
    fn set_remote_temperature(&mut self, temperature_c: f32) -> Result<(), DeviceError>;

    /// Poll the unit for fresh snapshots
    fn sync(&mut self) -> Result<(), DeviceError>;

    /// Commit all staged changes
    fn update(&mut self) -> Result<(), DeviceError>;

    /// Drop staged changes, restaging the last committed settings
    fn discard(&mut self);

    /// Room temperature from the latest status snapshot
    fn current_temperature(&self) -> Option<f32> {
        self.status().map(|s| s.room_temperature)
    }

    /// Power flag from the latest settings snapshot
    fn power_on(&self) -> Option<bool> {
        self.settings().map(|s| s.power)
    }
}
