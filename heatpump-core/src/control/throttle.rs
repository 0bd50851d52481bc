//! Rate-limited power actuation
//!
//! Power transitions issued by the workflow go through the throttle so the
//! compressor is not cycled faster than once per cooldown window. User
//! commands bypass it and commit directly.

use crate::traits::{DeviceError, HeatPumpDevice};

/// Result of a throttled power request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Actuation {
    /// Unit acknowledged the new power state
    Applied,
    /// Cooldown still running, nothing sent
    Throttled { remaining_ms: u64 },
    /// Unit did not acknowledge, state unchanged
    Failed(DeviceError),
}

/// Cooldown gate for workflow power transitions
///
/// Timestamps are milliseconds from a monotonic clock. Wraparound of the
/// clock is not handled.
#[derive(Debug, Clone)]
pub struct ActuationThrottle {
    cooldown_ms: u64,
    last_actuation_ms: Option<u64>,
    power_on: Option<bool>,
}

impl ActuationThrottle {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_actuation_ms: None,
            power_on: None,
        }
    }

    /// Request the unit be powered on
    pub fn turn_on<D: HeatPumpDevice>(&mut self, device: &mut D, now_ms: u64) -> Actuation {
        self.actuate(device, true, now_ms)
    }

    /// Request the unit be powered off
    pub fn turn_off<D: HeatPumpDevice>(&mut self, device: &mut D, now_ms: u64) -> Actuation {
        self.actuate(device, false, now_ms)
    }

    fn actuate<D: HeatPumpDevice>(&mut self, device: &mut D, on: bool, now_ms: u64) -> Actuation {
        let remaining_ms = self.remaining_ms(now_ms);
        if remaining_ms > 0 {
            debug!(
                "Power {} throttled, {} ms of cooldown left",
                on, remaining_ms
            );
            return Actuation::Throttled { remaining_ms };
        }

        device.set_power(on);
        match device.update() {
            Ok(()) => {
                self.last_actuation_ms = Some(now_ms);
                self.power_on = Some(on);
                Actuation::Applied
            }
            Err(e) => {
                warn!("Power {} not acknowledged: {:?}", on, e);
                device.discard();
                Actuation::Failed(e)
            }
        }
    }

    /// Time left before the next transition is allowed
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_actuation_ms {
            Some(last) => self
                .cooldown_ms
                .saturating_sub(now_ms.saturating_sub(last)),
            None => 0,
        }
    }

    /// Check if a transition would be allowed now
    pub fn is_ready(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Time of the last acknowledged transition
    pub fn last_actuation_ms(&self) -> Option<u64> {
        self.last_actuation_ms
    }

    /// Power state set by the last acknowledged transition
    pub fn power_on(&self) -> Option<bool> {
        self.power_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::DeviceMode;
    use crate::testing::MockDevice;

    const COOLDOWN_MS: u64 = 60_000;

    #[test]
    fn test_first_request_is_applied() {
        let mut device = MockDevice::reporting(true, DeviceMode::Heat, 21.0, 20.0);
        let mut throttle = ActuationThrottle::new(COOLDOWN_MS);

        assert_eq!(throttle.turn_off(&mut device, 0), Actuation::Applied);
        assert_eq!(throttle.power_on(), Some(false));
        assert_eq!(throttle.last_actuation_ms(), Some(0));
        assert_eq!(device.settings.map(|s| s.power), Some(false));
    }

    #[test]
    fn test_second_request_within_cooldown_rejected() {
        let mut device = MockDevice::reporting(true, DeviceMode::Heat, 21.0, 20.0);
        let mut throttle = ActuationThrottle::new(COOLDOWN_MS);

        assert_eq!(throttle.turn_off(&mut device, 1_000), Actuation::Applied);
        assert_eq!(
            throttle.turn_off(&mut device, 31_000),
            Actuation::Throttled {
                remaining_ms: 30_000
            }
        );
        assert_eq!(throttle.last_actuation_ms(), Some(1_000));
        assert_eq!(device.commits, 1);
        assert_eq!(device.power_commands.len(), 1);
    }

    #[test]
    fn test_requests_spaced_beyond_cooldown_both_applied() {
        let mut device = MockDevice::reporting(true, DeviceMode::Cool, 24.0, 26.0);
        let mut throttle = ActuationThrottle::new(COOLDOWN_MS);

        assert_eq!(throttle.turn_off(&mut device, 0), Actuation::Applied);
        assert_eq!(throttle.turn_on(&mut device, 60_001), Actuation::Applied);
        assert_eq!(throttle.power_on(), Some(true));
        assert_eq!(throttle.last_actuation_ms(), Some(60_001));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let mut device = MockDevice::reporting(true, DeviceMode::Heat, 21.0, 20.0);
        let mut throttle = ActuationThrottle::new(COOLDOWN_MS);

        throttle.turn_off(&mut device, 0);
        assert!(!throttle.is_ready(COOLDOWN_MS - 1));
        assert!(throttle.is_ready(COOLDOWN_MS));
        assert_eq!(throttle.turn_on(&mut device, COOLDOWN_MS), Actuation::Applied);
    }

    #[test]
    fn test_unacknowledged_request_leaves_state() {
        let mut device = MockDevice::reporting(true, DeviceMode::Heat, 21.0, 20.0);
        device.fail_updates = true;
        let mut throttle = ActuationThrottle::new(COOLDOWN_MS);

        assert_eq!(
            throttle.turn_off(&mut device, 5_000),
            Actuation::Failed(DeviceError::NotAcknowledged)
        );
        assert_eq!(throttle.last_actuation_ms(), None);
        assert_eq!(throttle.power_on(), None);
        assert_eq!(device.discards, 1);

        // Retried on the next tick without waiting for a cooldown
        device.fail_updates = false;
        assert_eq!(throttle.turn_off(&mut device, 5_500), Actuation::Applied);
    }
}
