//! Workflow engine state and tick

use core::fmt::Write;

use heapless::String;

use super::policy::{decide, Decision, OffReason, PolicyInput};
use crate::climate::{Action, Mode};
use crate::config::{ControllerConfig, TemperatureLimits, WorkflowConfig};
use crate::control::math::{abs, approx_eq};
use crate::control::{Actuation, ActuationThrottle, PidController};
use crate::traits::{DeviceError, HeatPumpDevice, HeatPumpSettings};

/// Capacity of the diagnostic dump
pub const DUMP_CAPACITY: usize = 512;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Unit has not reported both snapshots yet
    NotReady,
    /// Climate mode is off
    Inactive,
    /// No usable target temperature
    NoSetpoint,
    /// No power transition needed
    Held { correction: f32 },
    /// Power transition acknowledged by the unit
    Actuated { power_on: bool, correction: f32 },
    /// Power transition wanted but still in cooldown
    Throttled { correction: f32, remaining_ms: u64 },
    /// Power transition not acknowledged, retried next tick
    ActuationFailed(DeviceError),
}

/// Closed-loop workflow over one indoor unit
///
/// Owns the unit handle. Snapshot callbacks update the mirrored state and
/// [`tick`](WorkflowEngine::tick) acts on it.
pub struct WorkflowEngine<D> {
    device: D,
    pid: PidController,
    throttle: ActuationThrottle,
    config: WorkflowConfig,
    limits: TemperatureLimits,
    mode: Mode,
    action: Action,
    current_temperature: Option<f32>,
    target_temperature: Option<f32>,
    device_power_on: bool,
    operating: bool,
    settings_ready: bool,
    status_ready: bool,
    /// Unit powered off by the workflow, climate mode retained
    suspended: bool,
    /// Last setpoint sent to the unit
    commanded_setpoint: Option<f32>,
}

impl<D: HeatPumpDevice> WorkflowEngine<D> {
    /// Create an engine for a unit
    ///
    /// The PID sample time is the polling interval.
    pub fn new(device: D, config: &ControllerConfig) -> Self {
        let tuning = &config.pid;
        Self {
            device,
            pid: PidController::new(
                tuning.p,
                tuning.i,
                tuning.d,
                config.poll_interval_ms,
                0.0,
                tuning.output_min,
                tuning.output_max,
            ),
            throttle: ActuationThrottle::new(config.workflow.actuation_cooldown_ms),
            config: config.workflow,
            limits: config.limits,
            mode: Mode::Off,
            action: Action::Off,
            current_temperature: None,
            target_temperature: None,
            device_power_on: false,
            operating: false,
            settings_ready: false,
            status_ready: false,
            suspended: false,
            commanded_setpoint: None,
        }
    }

    fn refresh_action(&mut self) {
        // Without a status snapshot there is no operating flag to go on
        if !self.status_ready {
            self.action = if self.device_power_on {
                self.mode.profile().default_action
            } else {
                Action::Off
            };
            return;
        }
        self.action = Action::resolve(
            self.mode,
            self.device_power_on,
            self.operating,
            self.current_temperature,
            self.target_temperature,
        );
    }

    /// Climate target changed
    pub fn on_target_temperature_changed(&mut self, target_c: f32) {
        if !target_c.is_finite() {
            return;
        }
        self.target_temperature = Some(target_c);
        self.refresh_action();
    }

    /// Climate mode changed by the user
    ///
    /// A change of mode discards PID history and ends any suspension.
    pub fn on_mode_changed(&mut self, mode: Mode) {
        if mode != self.mode {
            self.pid.reset_state();
        }
        self.mode = mode;
        self.suspended = false;
        self.refresh_action();
    }

    /// Unit reported its settings
    ///
    /// Returns the unit setpoint if it was adopted as the climate target.
    /// A setpoint equal to the one the workflow last sent is its own echo
    /// and leaves the target alone.
    pub fn on_settings_snapshot_received(&mut self, settings: &HeatPumpSettings) -> Option<f32> {
        self.device_power_on = settings.power;
        if settings.power {
            self.suspended = false;
        }

        let mode = if !settings.power && self.suspended {
            self.mode
        } else {
            Mode::from_device(settings.power, settings.mode)
        };
        if mode != self.mode {
            debug!("Mode {:?} -> {:?}", self.mode, mode);
            self.pid.reset_state();
            self.mode = mode;
        }
        self.settings_ready = true;

        let echo = self
            .commanded_setpoint
            .map(|sent| approx_eq(sent, settings.temperature, self.config.target_epsilon_c))
            .unwrap_or(false);
        let adopted = if settings.temperature.is_finite() && !echo {
            self.target_temperature = Some(settings.temperature);
            self.commanded_setpoint = None;
            Some(settings.temperature)
        } else {
            None
        };

        self.refresh_action();
        adopted
    }

    /// Unit reported its status
    ///
    /// Non-finite room temperatures are dropped.
    pub fn on_status_snapshot_received(&mut self, current_c: f32, operating: bool) {
        if !current_c.is_finite() {
            debug!("Ignoring non-finite room temperature");
            return;
        }
        self.current_temperature = Some(current_c);
        self.operating = operating;
        self.status_ready = true;
        self.refresh_action();
    }

    /// A user command set the unit power and was acknowledged
    pub fn on_power_commanded(&mut self, on: bool) {
        self.device_power_on = on;
        self.suspended = false;
        self.refresh_action();
    }

    /// A user command set the unit setpoint and was acknowledged
    pub fn note_commanded_setpoint(&mut self, setpoint_c: f32) {
        self.commanded_setpoint = Some(setpoint_c);
    }

    /// Run one workflow tick
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if !(self.settings_ready && self.status_ready) {
            debug!(
                "Waiting for unit snapshots: settings={} status={}",
                self.settings_ready, self.status_ready
            );
            return TickOutcome::NotReady;
        }
        if self.mode == Mode::Off {
            return TickOutcome::Inactive;
        }
        let current = match self.current_temperature {
            Some(current) => current,
            None => return TickOutcome::NotReady,
        };
        let target = match self.target_temperature {
            Some(target) => target,
            None => return TickOutcome::NoSetpoint,
        };

        if !approx_eq(target, self.pid.target(), self.config.target_epsilon_c) {
            debug!("PID target {} -> {}", self.pid.target(), target);
            self.pid.set_target(target);
        }
        // Zero is the unset target
        if self.pid.target() == 0.0 {
            return TickOutcome::NoSetpoint;
        }

        let correction = self.pid.update(current);

        let decision = decide(&PolicyInput {
            mode: self.mode,
            action: self.action,
            device_power_on: self.device_power_on,
            current_c: current,
            correction_c: correction,
            hysteresis_margin_c: self.config.hysteresis_margin_c,
            output_min: self.pid.output_min(),
            output_max: self.pid.output_max(),
        });

        match decision {
            Decision::Hold => {
                self.forward_correction(correction);
                TickOutcome::Held { correction }
            }
            Decision::TurnOff(reason) => {
                match reason {
                    OffReason::Overheated => info!(
                        "Room {} above correction {}, powering off",
                        current, correction
                    ),
                    OffReason::Overcooled => info!(
                        "Room {} below correction {}, powering off",
                        current, correction
                    ),
                }
                self.actuate(false, correction, now_ms)
            }
            Decision::TurnOn => {
                info!(
                    "Room {} needs correction {}, powering on",
                    current, correction
                );
                self.actuate(true, correction, now_ms)
            }
        }
    }

    fn actuate(&mut self, on: bool, correction: f32, now_ms: u64) -> TickOutcome {
        let result = if on {
            self.throttle.turn_on(&mut self.device, now_ms)
        } else {
            self.throttle.turn_off(&mut self.device, now_ms)
        };

        match result {
            Actuation::Applied => {
                self.device_power_on = on;
                self.suspended = !on;
                self.refresh_action();
                TickOutcome::Actuated {
                    power_on: on,
                    correction,
                }
            }
            Actuation::Throttled { remaining_ms } => TickOutcome::Throttled {
                correction,
                remaining_ms,
            },
            Actuation::Failed(e) => TickOutcome::ActuationFailed(e),
        }
    }

    /// Send the quantised correction as the unit setpoint
    fn forward_correction(&mut self, correction: f32) {
        if !(self.config.forward_correction && self.device_power_on && self.mode.is_regulated()) {
            return;
        }
        // Resend only once the correction moved a full step from the last setpoint
        if let Some(sent) = self.commanded_setpoint {
            if abs(correction - sent) < self.limits.step_c {
                return;
            }
        }
        let setpoint = self.limits.quantize(correction);
        if self.commanded_setpoint == Some(setpoint) {
            return;
        }

        self.device.set_temperature(setpoint);
        match self.device.update() {
            Ok(()) => {
                debug!("Unit setpoint {}", setpoint);
                self.commanded_setpoint = Some(setpoint);
            }
            Err(e) => {
                warn!("Setpoint {} not acknowledged: {:?}", setpoint, e);
                self.device.discard();
            }
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn throttle(&self) -> &ActuationThrottle {
        &self.throttle
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn current_temperature(&self) -> Option<f32> {
        self.current_temperature
    }

    pub fn target_temperature(&self) -> Option<f32> {
        self.target_temperature
    }

    pub fn device_power_on(&self) -> bool {
        self.device_power_on
    }

    pub fn is_operating(&self) -> bool {
        self.operating
    }

    /// Both snapshots received
    pub fn is_ready(&self) -> bool {
        self.settings_ready && self.status_ready
    }

    /// Unit powered off by the workflow
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn commanded_setpoint(&self) -> Option<f32> {
        self.commanded_setpoint
    }

    /// Diagnostic text for operators
    pub fn dump_config(&self) -> String<DUMP_CAPACITY> {
        let mut out = String::new();
        let _ = write!(
            out,
            "Workflow: hysteresis={} cooldown={}ms forward_correction={} \
             mode={:?} action={:?} power={} suspended={}\n{}",
            self.config.hysteresis_margin_c,
            self.throttle.cooldown_ms(),
            self.config.forward_correction,
            self.mode,
            self.action,
            self.device_power_on,
            self.suspended,
            self.pid.dump_config(),
        );
        out
    }
}
