//! Vane positions and swing mapping

use strum::{EnumString, IntoStaticStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Swing mode offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwingMode {
    #[default]
    Off,
    Vertical,
    Horizontal,
    Both,
}

/// Vertical vane position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerticalVane {
    #[default]
    #[strum(serialize = "AUTO")]
    Auto,
    #[strum(serialize = "1")]
    Position1,
    #[strum(serialize = "2")]
    Position2,
    #[strum(serialize = "3")]
    Position3,
    #[strum(serialize = "4")]
    Position4,
    #[strum(serialize = "5")]
    Position5,
    #[strum(serialize = "SWING")]
    Swing,
}

/// Horizontal ("wide") vane position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HorizontalVane {
    #[strum(serialize = "<<")]
    FarLeft,
    #[strum(serialize = "<")]
    Left,
    #[default]
    #[strum(serialize = "|")]
    Center,
    #[strum(serialize = ">")]
    Right,
    #[strum(serialize = ">>")]
    FarRight,
    #[strum(serialize = "<>")]
    Split,
    #[strum(serialize = "SWING")]
    Swing,
}

impl VerticalVane {
    /// Wire name of the position
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl HorizontalVane {
    /// Wire name of the position
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl SwingMode {
    /// Vane positions that realise this swing mode
    pub fn to_device(self) -> (VerticalVane, HorizontalVane) {
        match self {
            SwingMode::Off => (VerticalVane::Auto, HorizontalVane::Center),
            SwingMode::Vertical => (VerticalVane::Swing, HorizontalVane::Center),
            SwingMode::Horizontal => (VerticalVane::Position3, HorizontalVane::Swing),
            SwingMode::Both => (VerticalVane::Swing, HorizontalVane::Swing),
        }
    }

    /// Swing mode reported for a pair of vane positions
    pub fn from_device(vane: VerticalVane, wide_vane: HorizontalVane) -> SwingMode {
        match (vane, wide_vane) {
            (VerticalVane::Swing, HorizontalVane::Swing) => SwingMode::Both,
            (VerticalVane::Swing, _) => SwingMode::Vertical,
            (_, HorizontalVane::Swing) => SwingMode::Horizontal,
            _ => SwingMode::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_swing_modes_map_both_ways() {
        for swing in [
            SwingMode::Off,
            SwingMode::Vertical,
            SwingMode::Horizontal,
            SwingMode::Both,
        ] {
            let (vane, wide) = swing.to_device();
            assert_eq!(SwingMode::from_device(vane, wide), swing);
        }
    }

    #[test]
    fn test_fixed_positions_report_no_swing() {
        assert_eq!(
            SwingMode::from_device(VerticalVane::Position2, HorizontalVane::Left),
            SwingMode::Off
        );
    }

    #[test]
    fn test_vane_wire_names() {
        assert_eq!(HorizontalVane::from_str("<>"), Ok(HorizontalVane::Split));
        assert_eq!(HorizontalVane::from_str(">>"), Ok(HorizontalVane::FarRight));
        assert_eq!(VerticalVane::from_str("5"), Ok(VerticalVane::Position5));
        assert_eq!(VerticalVane::Swing.as_str(), "SWING");
        assert!(VerticalVane::from_str("6").is_err());
    }
}
