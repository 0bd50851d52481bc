//! Climate modes and actions

use strum::{EnumString, IntoStaticStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Climate mode requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    Off,
    Heat,
    Cool,
    Dry,
    HeatCool,
    FanOnly,
}

/// What the unit is currently doing
///
/// Always derived from the mode, the unit's power and operating flags and
/// the temperatures. Never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Off,
    Idle,
    Heating,
    Cooling,
    Drying,
    Fan,
}

/// Operating mode as spoken by the indoor unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMode {
    #[strum(serialize = "HEAT")]
    Heat,
    #[strum(serialize = "DRY")]
    Dry,
    #[strum(serialize = "COOL")]
    Cool,
    #[strum(serialize = "FAN")]
    Fan,
    #[strum(serialize = "AUTO")]
    Auto,
}

impl DeviceMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// One row of the mode table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub mode: Mode,
    /// Unit mode to command, `None` when the unit is powered off instead
    pub device_mode: Option<DeviceMode>,
    /// Action reported right after switching into the mode
    pub default_action: Action,
}

/// Mapping of every climate mode onto the unit
pub const MODE_TABLE: [ModeProfile; 6] = [
    ModeProfile {
        mode: Mode::Off,
        device_mode: None,
        default_action: Action::Off,
    },
    ModeProfile {
        mode: Mode::Heat,
        device_mode: Some(DeviceMode::Heat),
        default_action: Action::Idle,
    },
    ModeProfile {
        mode: Mode::Cool,
        device_mode: Some(DeviceMode::Cool),
        default_action: Action::Idle,
    },
    ModeProfile {
        mode: Mode::Dry,
        device_mode: Some(DeviceMode::Dry),
        default_action: Action::Drying,
    },
    ModeProfile {
        mode: Mode::HeatCool,
        device_mode: Some(DeviceMode::Auto),
        default_action: Action::Idle,
    },
    ModeProfile {
        mode: Mode::FanOnly,
        device_mode: Some(DeviceMode::Fan),
        default_action: Action::Fan,
    },
];

impl Mode {
    /// Look up the table row for this mode
    pub fn profile(self) -> &'static ModeProfile {
        // Rows are ordered like the enum variants
        &MODE_TABLE[self as usize]
    }

    /// Unit mode for this climate mode
    pub fn device_mode(self) -> Option<DeviceMode> {
        self.profile().device_mode
    }

    /// Climate mode reported by a powered unit
    pub fn from_device(power_on: bool, device_mode: DeviceMode) -> Mode {
        if !power_on {
            return Mode::Off;
        }
        MODE_TABLE
            .iter()
            .find(|row| row.device_mode == Some(device_mode))
            .map(|row| row.mode)
            .unwrap_or(Mode::Off)
    }

    /// Modes in which the workflow regulates power
    pub fn is_regulated(self) -> bool {
        matches!(self, Mode::Heat | Mode::Cool)
    }

    /// Modes that keep a remembered setpoint
    pub fn has_setpoint(self) -> bool {
        matches!(self, Mode::Heat | Mode::Cool | Mode::HeatCool)
    }
}

impl Action {
    /// Derive the action from the latest unit state
    pub fn resolve(
        mode: Mode,
        power_on: bool,
        operating: bool,
        current: Option<f32>,
        target: Option<f32>,
    ) -> Action {
        if !power_on {
            return Action::Off;
        }
        match mode {
            Mode::Off => Action::Off,
            Mode::Heat if operating => Action::Heating,
            Mode::Cool if operating => Action::Cooling,
            Mode::Dry if operating => Action::Drying,
            Mode::HeatCool if operating => match (current, target) {
                (Some(current), Some(target)) if current > target => Action::Cooling,
                (Some(current), Some(target)) if current < target => Action::Heating,
                _ => Action::Idle,
            },
            Mode::FanOnly => Action::Fan,
            _ => Action::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_table_matches_variant_order() {
        for (i, row) in MODE_TABLE.iter().enumerate() {
            assert_eq!(row.mode as usize, i);
        }
    }

    #[test]
    fn test_mode_round_trip_through_unit() {
        for row in MODE_TABLE.iter() {
            if let Some(device_mode) = row.device_mode {
                assert_eq!(Mode::from_device(true, device_mode), row.mode);
            }
        }
        assert_eq!(Mode::from_device(false, DeviceMode::Heat), Mode::Off);
    }

    #[test]
    fn test_device_mode_wire_names() {
        assert_eq!(DeviceMode::from_str("AUTO"), Ok(DeviceMode::Auto));
        assert_eq!(DeviceMode::Fan.as_str(), "FAN");
        assert!(DeviceMode::from_str("heat").is_err());
    }

    #[test]
    fn test_action_from_operating_flag() {
        assert_eq!(
            Action::resolve(Mode::Heat, true, true, None, None),
            Action::Heating
        );
        assert_eq!(
            Action::resolve(Mode::Heat, true, false, None, None),
            Action::Idle
        );
        assert_eq!(
            Action::resolve(Mode::Cool, true, true, None, None),
            Action::Cooling
        );
        assert_eq!(
            Action::resolve(Mode::Dry, true, false, None, None),
            Action::Idle
        );
        assert_eq!(
            Action::resolve(Mode::FanOnly, true, false, None, None),
            Action::Fan
        );
        assert_eq!(
            Action::resolve(Mode::Cool, false, true, None, None),
            Action::Off
        );
    }

    #[test]
    fn test_auto_action_follows_temperatures() {
        let warm = Action::resolve(Mode::HeatCool, true, true, Some(24.0), Some(21.0));
        let cold = Action::resolve(Mode::HeatCool, true, true, Some(18.0), Some(21.0));
        let equal = Action::resolve(Mode::HeatCool, true, true, Some(21.0), Some(21.0));
        assert_eq!(warm, Action::Cooling);
        assert_eq!(cold, Action::Heating);
        assert_eq!(equal, Action::Idle);
    }
}
