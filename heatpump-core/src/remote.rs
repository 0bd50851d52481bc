//! Remote temperature sensor policy
//!
//! An external sensor can replace the unit's internal room sensor. The unit
//! is told the remote value when it changes, and again periodically since
//! some units forget it. Stale values and a silent controller both revert
//! the unit to its internal sensor.

use crate::config::RemoteSensorConfig;
use crate::traits::{DeviceError, HeatPumpDevice};

const MS_PER_MINUTE: u64 = 60_000;

/// Remote sensor state
///
/// A temperature of 0 means the internal sensor is in use.
#[derive(Debug, Clone)]
pub struct RemoteTemperature {
    config: RemoteSensorConfig,
    temperature_c: f32,
    last_update_ms: Option<u64>,
    last_publish_ms: Option<u64>,
    last_ping_ms: Option<u64>,
}

impl RemoteTemperature {
    /// Create the policy, treating the controller as alive at `now_ms`
    pub fn new(config: RemoteSensorConfig, now_ms: u64) -> Self {
        Self {
            config,
            temperature_c: 0.0,
            last_update_ms: None,
            last_publish_ms: None,
            last_ping_ms: Some(now_ms),
        }
    }

    /// Active remote temperature
    pub fn temperature(&self) -> Option<f32> {
        if self.temperature_c > 0.0 {
            Some(self.temperature_c)
        } else {
            None
        }
    }

    /// Set the remote temperature, 0 or below reverts to the internal sensor
    ///
    /// Returns whether the value was sent to the unit.
    pub fn set<D: HeatPumpDevice>(
        &mut self,
        device: &mut D,
        temperature_c: f32,
        now_ms: u64,
    ) -> Result<bool, DeviceError> {
        let temperature_c = if temperature_c.is_finite() && temperature_c > 0.0 {
            temperature_c
        } else {
            0.0
        };

        let is_new = self.temperature_c != temperature_c;
        if is_new {
            self.temperature_c = temperature_c;
            self.last_update_ms = if temperature_c > 0.0 { Some(now_ms) } else { None };
        }

        let refresh = match (self.config.publish_frequency_s, self.last_publish_ms) {
            (Some(frequency_s), Some(last)) => {
                now_ms.saturating_sub(last) >= u64::from(frequency_s) * 1000
            }
            (Some(_), None) => true,
            (None, _) => false,
        };

        // Zero is only sent once, when it replaces a remote value
        if is_new || (refresh && self.temperature_c != 0.0) {
            debug!("Setting remote temperature {}", self.temperature_c);
            device.set_remote_temperature(self.temperature_c)?;
            self.last_publish_ms = Some(now_ms);
            return Ok(true);
        }
        Ok(false)
    }

    /// Record that the controller is alive
    pub fn ping(&mut self, now_ms: u64) {
        debug!("Ping received");
        self.last_ping_ms = Some(now_ms);
    }

    /// Treat the active remote value as fresh
    ///
    /// Sensors that only report on change would otherwise go stale right
    /// after a user change makes the unit start operating.
    pub fn touch(&mut self, now_ms: u64) {
        if self.last_update_ms.is_some() {
            self.last_update_ms = Some(now_ms);
        }
    }

    /// Revert to the internal sensor when a timeout expired
    pub fn enforce_timeouts<D: HeatPumpDevice>(
        &mut self,
        device: &mut D,
        operating: bool,
        now_ms: u64,
    ) -> Result<(), DeviceError> {
        if let (Some(timeout_min), Some(last)) = (self.config.ping_timeout_min, self.last_ping_ms) {
            if now_ms.saturating_sub(last) > u64::from(timeout_min) * MS_PER_MINUTE {
                warn!("Ping timeout, reverting to internal sensor");
                self.last_ping_ms = None;
                self.set(device, 0.0, now_ms)?;
                return Ok(());
            }
        }

        let timeout = if operating {
            self.config.operating_timeout_min
        } else {
            self.config.idle_timeout_min
        };
        if let (Some(timeout_min), Some(last)) = (timeout, self.last_update_ms) {
            if now_ms.saturating_sub(last) > u64::from(timeout_min) * MS_PER_MINUTE {
                warn!(
                    "Remote temperature stale, operating={}, reverting to internal sensor",
                    operating
                );
                self.set(device, 0.0, now_ms)?;
            }
        }
        Ok(())
    }

    /// Enforce timeouts, then re-publish the active value when due
    pub fn poll<D: HeatPumpDevice>(
        &mut self,
        device: &mut D,
        operating: bool,
        now_ms: u64,
    ) -> Result<(), DeviceError> {
        self.enforce_timeouts(device, operating, now_ms)?;
        self.set(device, self.temperature_c, now_ms)?;
        Ok(())
    }
}
