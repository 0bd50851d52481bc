//! Power decision policy
//!
//! Pure function of the latest state, kept apart from the engine so every
//! branch can be tested without a device.

use crate::climate::{Action, Mode};

/// Why the workflow wants the unit off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OffReason {
    /// Room is warmer than the corrected setpoint allows while heating
    Overheated,
    /// Room is cooler than the corrected setpoint allows while cooling
    Overcooled,
}

/// Power decision for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    Hold,
    TurnOff(OffReason),
    TurnOn,
}

/// State the decision is made from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub mode: Mode,
    pub action: Action,
    pub device_power_on: bool,
    pub current_c: f32,
    /// PID output for this tick
    pub correction_c: f32,
    pub hysteresis_margin_c: f32,
    pub output_min: f32,
    pub output_max: f32,
}

impl PolicyInput {
    fn heating_overshot(&self) -> bool {
        self.current_c - self.correction_c > self.hysteresis_margin_c
            || self.correction_c <= self.output_min
    }

    fn cooling_overshot(&self) -> bool {
        self.correction_c - self.current_c > self.hysteresis_margin_c
            || self.correction_c >= self.output_max
    }
}

/// Decide the power transition for this tick
///
/// Only heat and cool are regulated; every other mode holds.
pub fn decide(input: &PolicyInput) -> Decision {
    if !input.mode.is_regulated() {
        return Decision::Hold;
    }

    match input.action {
        Action::Heating => {
            if input.device_power_on && input.heating_overshot() {
                Decision::TurnOff(OffReason::Overheated)
            } else {
                Decision::Hold
            }
        }
        Action::Cooling => {
            if input.device_power_on && input.cooling_overshot() {
                Decision::TurnOff(OffReason::Overcooled)
            } else {
                Decision::Hold
            }
        }
        Action::Idle => {
            if !input.device_power_on {
                return Decision::Hold;
            }
            match input.mode {
                Mode::Heat if input.heating_overshot() => Decision::TurnOff(OffReason::Overheated),
                Mode::Cool if input.cooling_overshot() => Decision::TurnOff(OffReason::Overcooled),
                _ => Decision::Hold,
            }
        }
        _ => {
            if input.device_power_on {
                return Decision::Hold;
            }
            match input.mode {
                Mode::Heat if input.current_c <= input.correction_c => Decision::TurnOn,
                Mode::Cool if input.current_c >= input.correction_c => Decision::TurnOn,
                _ => Decision::Hold,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: Mode, action: Action, power: bool, current: f32, correction: f32) -> PolicyInput {
        PolicyInput {
            mode,
            action,
            device_power_on: power,
            current_c: current,
            correction_c: correction,
            hysteresis_margin_c: 1.0,
            output_min: 16.0,
            output_max: 31.0,
        }
    }

    #[test]
    fn test_heating_at_min_output_turns_off() {
        let decision = decide(&input(Mode::Heat, Action::Heating, true, 72.0, 16.0));
        assert_eq!(decision, Decision::TurnOff(OffReason::Overheated));
    }

    #[test]
    fn test_heating_within_margin_holds() {
        assert_eq!(
            decide(&input(Mode::Heat, Action::Heating, true, 22.0, 21.0)),
            Decision::Hold
        );
        assert_eq!(
            decide(&input(Mode::Heat, Action::Heating, true, 22.1, 21.0)),
            Decision::TurnOff(OffReason::Overheated)
        );
    }

    #[test]
    fn test_heating_with_unit_off_holds() {
        assert_eq!(
            decide(&input(Mode::Heat, Action::Heating, false, 30.0, 16.0)),
            Decision::Hold
        );
    }

    #[test]
    fn test_cooling_overshoot() {
        assert_eq!(
            decide(&input(Mode::Cool, Action::Cooling, true, 22.0, 23.5)),
            Decision::TurnOff(OffReason::Overcooled)
        );
        assert_eq!(
            decide(&input(Mode::Cool, Action::Cooling, true, 25.0, 31.0)),
            Decision::TurnOff(OffReason::Overcooled)
        );
        assert_eq!(
            decide(&input(Mode::Cool, Action::Cooling, true, 25.0, 24.5)),
            Decision::Hold
        );
    }

    #[test]
    fn test_idle_applies_mode_test() {
        assert_eq!(
            decide(&input(Mode::Heat, Action::Idle, true, 23.0, 21.0)),
            Decision::TurnOff(OffReason::Overheated)
        );
        assert_eq!(
            decide(&input(Mode::Cool, Action::Idle, true, 19.0, 21.0)),
            Decision::TurnOff(OffReason::Overcooled)
        );
        assert_eq!(
            decide(&input(Mode::Heat, Action::Idle, false, 23.0, 21.0)),
            Decision::Hold
        );
    }

    #[test]
    fn test_heat_turn_on_boundary() {
        // Equal counts as needing heat
        assert_eq!(
            decide(&input(Mode::Heat, Action::Off, false, 21.0, 21.0)),
            Decision::TurnOn
        );
        assert_eq!(
            decide(&input(Mode::Heat, Action::Off, false, 21.01, 21.0)),
            Decision::Hold
        );
    }

    #[test]
    fn test_cool_turn_on_boundary() {
        assert_eq!(
            decide(&input(Mode::Cool, Action::Off, false, 24.0, 24.0)),
            Decision::TurnOn
        );
        assert_eq!(
            decide(&input(Mode::Cool, Action::Off, false, 23.99, 24.0)),
            Decision::Hold
        );
    }

    #[test]
    fn test_off_branch_with_unit_on_holds() {
        assert_eq!(
            decide(&input(Mode::Heat, Action::Off, true, 18.0, 25.0)),
            Decision::Hold
        );
    }

    #[test]
    fn test_unregulated_modes_hold() {
        for mode in [Mode::Dry, Mode::FanOnly, Mode::HeatCool, Mode::Off] {
            assert_eq!(
                decide(&input(mode, Action::Heating, true, 40.0, 16.0)),
                Decision::Hold
            );
        }
    }
}
