//! Configuration type definitions
//!
//! Every field has a default so that partial configuration files are valid.
//! Defaults follow the behavior of the indoor units this controller targets.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default polling interval (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 500;

/// Longest usable polling interval (ms)
///
/// Above 9 s the unit's serial library reconnects and drops the pending
/// data request.
pub const MAX_POLL_INTERVAL_MS: u32 = 9000;

/// Lowest setpoint accepted by the unit (°C)
pub const MIN_TEMPERATURE_C: f32 = 16.0;

/// Highest setpoint accepted by the unit (°C)
pub const MAX_TEMPERATURE_C: f32 = 31.0;

/// Setpoint resolution of the unit (°C)
pub const TEMPERATURE_STEP_C: f32 = 0.5;

/// Slack band around the corrected setpoint before powering off (°C)
pub const DEFAULT_HYSTERESIS_MARGIN_C: f32 = 1.0;

/// Minimum time between workflow-initiated power transitions (ms)
pub const DEFAULT_ACTUATION_COOLDOWN_MS: u64 = 60_000;

/// Tolerance when comparing the climate target with the PID target (°C)
pub const DEFAULT_TARGET_EPSILON_C: f32 = 0.001;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Polling interval is zero or above the unit's limit
    PollInterval,
    /// PID output minimum exceeds the maximum
    OutputLimits,
    /// Temperature range is empty or the step is not positive
    TemperatureLimits,
    /// Hysteresis margin is negative or not finite
    Hysteresis,
    /// Actuation cooldown is zero
    Cooldown,
    /// A PID gain is NaN or infinite
    Gains,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PollInterval => write!(
                f,
                "poll interval must be within 1..={} ms",
                MAX_POLL_INTERVAL_MS
            ),
            ConfigError::OutputLimits => write!(f, "PID output_min exceeds output_max"),
            ConfigError::TemperatureLimits => write!(f, "invalid temperature limits"),
            ConfigError::Hysteresis => write!(f, "hysteresis margin must be finite and >= 0"),
            ConfigError::Cooldown => write!(f, "actuation cooldown must be non-zero"),
            ConfigError::Gains => write!(f, "PID gains must be finite"),
        }
    }
}

/// PID gains and output clamp
///
/// Gains are in user units; the controller scales `i` and `d` by the
/// sample time. The output is the corrected setpoint handed to the unit, so
/// the clamp defaults to the unit's settable range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PidTuning {
    /// Proportional gain
    pub p: f32,
    /// Integral gain (per second)
    pub i: f32,
    /// Derivative gain (seconds)
    pub d: f32,
    /// Lower output bound
    pub output_min: f32,
    /// Upper output bound
    pub output_max: f32,
}

impl Default for PidTuning {
    fn default() -> Self {
        Self {
            p: 1.0,
            i: 0.01,
            d: 0.0,
            output_min: MIN_TEMPERATURE_C,
            output_max: MAX_TEMPERATURE_C,
        }
    }
}

/// Workflow decision parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkflowConfig {
    /// Tolerance band before the unit is powered off (°C)
    pub hysteresis_margin_c: f32,
    /// Minimum spacing of workflow power transitions (ms)
    pub actuation_cooldown_ms: u64,
    /// Target comparison tolerance (°C)
    pub target_epsilon_c: f32,
    /// Send the PID correction to the unit as its setpoint
    pub forward_correction: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            hysteresis_margin_c: DEFAULT_HYSTERESIS_MARGIN_C,
            actuation_cooldown_ms: DEFAULT_ACTUATION_COOLDOWN_MS,
            target_epsilon_c: DEFAULT_TARGET_EPSILON_C,
            forward_correction: true,
        }
    }
}

/// Settable temperature range of the unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TemperatureLimits {
    /// Lowest setpoint (°C)
    pub min_c: f32,
    /// Highest setpoint (°C)
    pub max_c: f32,
    /// Setpoint resolution (°C)
    pub step_c: f32,
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min_c: MIN_TEMPERATURE_C,
            max_c: MAX_TEMPERATURE_C,
            step_c: TEMPERATURE_STEP_C,
        }
    }
}

impl TemperatureLimits {
    /// Clamp a temperature into the settable range
    pub fn clamp(&self, temperature_c: f32) -> f32 {
        if temperature_c < self.min_c {
            self.min_c
        } else if temperature_c > self.max_c {
            self.max_c
        } else {
            temperature_c
        }
    }

    /// Clamp and round a temperature to the nearest settable step
    pub fn quantize(&self, temperature_c: f32) -> f32 {
        let clamped = self.clamp(temperature_c);
        let steps = ((clamped - self.min_c) / self.step_c + 0.5) as u32;
        self.clamp(self.min_c + steps as f32 * self.step_c)
    }
}

/// Remote temperature sensor policy
///
/// All fields are optional; an unset field disables that behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemoteSensorConfig {
    /// Re-send the remote temperature at least this often (s)
    ///
    /// Newer units forget a remote reading after roughly a minute.
    pub publish_frequency_s: Option<u32>,
    /// Revert to the internal sensor after this long without an update
    /// while the unit is operating (min)
    pub operating_timeout_min: Option<u32>,
    /// Revert to the internal sensor after this long without an update
    /// while the unit is idle (min)
    pub idle_timeout_min: Option<u32>,
    /// Revert to the internal sensor after this long without a ping (min)
    pub ping_timeout_min: Option<u32>,
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Polling interval, also the PID sample time (ms)
    pub poll_interval_ms: u32,
    /// PID gains and clamp
    pub pid: PidTuning,
    /// Workflow decision parameters
    pub workflow: WorkflowConfig,
    /// Settable temperature range
    pub limits: TemperatureLimits,
    /// Remote sensor policy
    pub remote: RemoteSensorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            pid: PidTuning::default(),
            workflow: WorkflowConfig::default(),
            limits: TemperatureLimits::default(),
            remote: RemoteSensorConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::PollInterval);
        }

        let pid = &self.pid;
        if !(pid.p.is_finite() && pid.i.is_finite() && pid.d.is_finite()) {
            return Err(ConfigError::Gains);
        }
        // NaN bounds fail this comparison too
        if !(pid.output_min <= pid.output_max) {
            return Err(ConfigError::OutputLimits);
        }

        let limits = &self.limits;
        if !(limits.min_c < limits.max_c) || !(limits.step_c > 0.0) {
            return Err(ConfigError::TemperatureLimits);
        }

        let margin = self.workflow.hysteresis_margin_c;
        if !margin.is_finite() || margin < 0.0 {
            return Err(ConfigError::Hysteresis);
        }

        if self.workflow.actuation_cooldown_ms == 0 {
            return Err(ConfigError::Cooldown);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ControllerConfig::new();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.workflow.hysteresis_margin_c, 1.0);
        assert_eq!(config.workflow.actuation_cooldown_ms, 60_000);
    }

    #[test]
    fn test_poll_interval_bounds() {
        let mut config = ControllerConfig::new();
        config.poll_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::PollInterval));

        config.poll_interval_ms = 9001;
        assert_eq!(config.validate(), Err(ConfigError::PollInterval));

        config.poll_interval_ms = 9000;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_inverted_output_limits_rejected() {
        let mut config = ControllerConfig::new();
        config.pid.output_min = 30.0;
        config.pid.output_max = 20.0;
        assert_eq!(config.validate(), Err(ConfigError::OutputLimits));
    }

    #[test]
    fn test_non_finite_gain_rejected() {
        let mut config = ControllerConfig::new();
        config.pid.d = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigError::Gains));
    }

    #[test]
    fn test_quantize_to_unit_step() {
        let limits = TemperatureLimits::default();
        assert_eq!(limits.quantize(21.2), 21.0);
        assert_eq!(limits.quantize(21.3), 21.5);
        assert_eq!(limits.quantize(10.0), 16.0);
        assert_eq!(limits.quantize(40.0), 31.0);
    }
}
