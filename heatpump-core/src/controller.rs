//! Climate controller facade
//!
//! The controller is what a host integration talks to:
//! - Applies user commands immediately, bypassing the workflow throttle
//! - Polls the unit and feeds its snapshots to the workflow engine
//! - Remembers the setpoint of each mode
//! - Enforces the remote temperature sensor policy
//! - Publishes the climate state

use core::fmt::Write;

use heapless::String;

use crate::climate::{
    Action, ClimateCall, FanMode, HorizontalVane, Mode, SwingMode, VerticalVane,
};
use crate::config::{ConfigError, ControllerConfig, TemperatureLimits};
use crate::remote::RemoteTemperature;
use crate::setpoints::SetpointMemory;
use crate::traits::{DeviceError, HeatPumpDevice, HeatPumpSettings, SetpointStorage};
use crate::workflow::{TickOutcome, WorkflowEngine};

/// Capacity of the diagnostic dump
pub const DUMP_CAPACITY: usize = 1024;

/// Published climate state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateState {
    pub mode: Mode,
    pub action: Action,
    pub current_temperature: Option<f32>,
    pub target_temperature: Option<f32>,
    pub fan_mode: FanMode,
    pub swing_mode: SwingMode,
    pub vertical_vane: VerticalVane,
    pub horizontal_vane: HorizontalVane,
}

/// Controller for one indoor unit
pub struct HeatPumpController<D, S> {
    engine: WorkflowEngine<D>,
    storage: S,
    setpoints: SetpointMemory,
    remote: RemoteTemperature,
    limits: TemperatureLimits,
    poll_interval_ms: u32,
    forward_correction: bool,
    /// A settings snapshot was delivered since construction
    settings_seen: bool,
    fan_mode: FanMode,
    swing_mode: SwingMode,
    vertical_vane: VerticalVane,
    horizontal_vane: HorizontalVane,
}

impl<D: HeatPumpDevice, S: SetpointStorage> HeatPumpController<D, S> {
    /// Create a controller and restore remembered setpoints
    pub fn new(
        device: D,
        mut storage: S,
        config: &ControllerConfig,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            warn!("Configuration rejected: {:?}", e);
            return Err(e);
        }

        let mut setpoints = SetpointMemory::new(config.limits);
        setpoints.load(&mut storage);

        Ok(Self {
            engine: WorkflowEngine::new(device, config),
            storage,
            setpoints,
            remote: RemoteTemperature::new(config.remote, now_ms),
            limits: config.limits,
            poll_interval_ms: config.poll_interval_ms,
            forward_correction: config.workflow.forward_correction,
            settings_seen: false,
            fan_mode: FanMode::default(),
            swing_mode: SwingMode::default(),
            vertical_vane: VerticalVane::default(),
            horizontal_vane: HorizontalVane::default(),
        })
    }

    /// Apply a user request and commit it to the unit
    ///
    /// Never throttled. On failure nothing is mirrored and the error is
    /// returned.
    pub fn control(&mut self, call: &ClimateCall, now_ms: u64) -> Result<ClimateState, DeviceError> {
        if call.is_empty() {
            return Ok(self.state());
        }
        self.remote.touch(now_ms);

        let mut target = call.target_temperature.map(|t| self.limits.quantize(t));
        let mut power = None;
        let device = self.engine.device_mut();

        if let Some(mode) = call.mode {
            match mode.device_mode() {
                Some(device_mode) => {
                    device.set_mode(device_mode);
                    device.set_power(true);
                    power = Some(true);
                    if target.is_none() {
                        target = self.setpoints.get(mode);
                    }
                }
                None => {
                    device.set_power(false);
                    power = Some(false);
                }
            }
        }

        if let Some(target) = target {
            device.set_temperature(target);
        }

        if let Some(fan_mode) = call.fan_mode {
            match fan_mode.to_device() {
                Some(speed) => device.set_fan_speed(speed),
                None => {
                    device.set_power(false);
                    power = Some(false);
                }
            }
        }

        let vanes = call.swing_mode.map(SwingMode::to_device);
        if let Some((vane, wide_vane)) = vanes {
            device.set_vane(vane);
            device.set_wide_vane(wide_vane);
        }

        if let Err(e) = device.update() {
            warn!("Control request not acknowledged: {:?}", e);
            device.discard();
            return Err(e);
        }

        if let Some(mode) = call.mode {
            self.engine.on_mode_changed(mode);
        }
        if let Some(on) = power {
            self.engine.on_power_commanded(on);
        }
        if let Some(target) = target {
            self.engine.on_target_temperature_changed(target);
            self.engine.note_commanded_setpoint(target);
            self.remember_setpoint(target);
        }
        if let Some(fan_mode) = call.fan_mode {
            self.fan_mode = fan_mode;
        }
        if let (Some(swing_mode), Some((vane, wide_vane))) = (call.swing_mode, vanes) {
            self.swing_mode = swing_mode;
            self.vertical_vane = vane;
            self.horizontal_vane = wide_vane;
        }

        Ok(self.state())
    }

    fn remember_setpoint(&mut self, target: f32) {
        let mode = self.engine.mode();
        if let Err(e) = self.setpoints.remember(&mut self.storage, mode, target) {
            warn!("Setpoint for {:?} not saved: {:?}", mode, e);
        }
    }

    /// Take the remembered target over the unit setpoint after a restart
    ///
    /// The unit setpoint is treated as the last forwarded correction.
    fn restore_target(&mut self, settings: &HeatPumpSettings) {
        let mode = Mode::from_device(settings.power, settings.mode);
        if let Some(target) = self.setpoints.get(mode) {
            info!(
                "Restoring {:?} target {} over unit setpoint {}",
                mode, target, settings.temperature
            );
            self.engine.note_commanded_setpoint(settings.temperature);
            self.engine.on_target_temperature_changed(target);
        }
    }

    /// Deliver the unit's settings snapshot
    fn on_settings_changed(&mut self) {
        let settings = match self.engine.device().settings() {
            Some(settings) => settings,
            None => {
                debug!("Waiting for unit settings");
                return;
            }
        };

        let first = !self.settings_seen;
        self.settings_seen = true;
        if first && self.forward_correction {
            self.restore_target(&settings);
        }

        if let Some(target) = self.engine.on_settings_snapshot_received(&settings) {
            // A forwarded correction may still be on the unit from before a restart
            if !(first && self.forward_correction) {
                self.remember_setpoint(target);
            }
        }
        self.fan_mode = FanMode::from_device(settings.fan);
        self.swing_mode = SwingMode::from_device(settings.vane, settings.wide_vane);
        self.vertical_vane = settings.vane;
        self.horizontal_vane = settings.wide_vane;
    }

    /// Deliver the unit's status snapshot
    fn on_status_changed(&mut self) {
        match self.engine.device().status() {
            Some(status) => self
                .engine
                .on_status_snapshot_received(status.room_temperature, status.operating),
            None => debug!("Waiting for unit status"),
        }
    }

    /// Run one polling interval
    ///
    /// Syncs the unit, delivers its snapshots, enforces the remote sensor
    /// policy and runs one workflow tick.
    pub fn poll(&mut self, now_ms: u64) -> TickOutcome {
        if let Err(e) = self.engine.device_mut().sync() {
            warn!("Unit sync failed: {:?}", e);
        }
        self.on_settings_changed();
        self.on_status_changed();

        let operating = self.engine.is_operating();
        if let Err(e) = self
            .remote
            .poll(self.engine.device_mut(), operating, now_ms)
        {
            warn!("Remote temperature not sent: {:?}", e);
        }

        self.engine.tick(now_ms)
    }

    /// Set the remote room temperature, 0 reverts to the internal sensor
    pub fn set_remote_temperature(&mut self, temperature_c: f32, now_ms: u64) -> Result<bool, DeviceError> {
        self.remote
            .set(self.engine.device_mut(), temperature_c, now_ms)
    }

    /// Record that the host controller is alive
    pub fn ping(&mut self, now_ms: u64) {
        self.remote.ping(now_ms);
    }

    /// Move the vertical vane
    pub fn set_vertical_vane(&mut self, vane: VerticalVane) -> Result<(), DeviceError> {
        let device = self.engine.device_mut();
        device.set_vane(vane);
        if let Err(e) = device.update() {
            device.discard();
            return Err(e);
        }
        self.vertical_vane = vane;
        self.swing_mode = SwingMode::from_device(vane, self.horizontal_vane);
        Ok(())
    }

    /// Move the horizontal vane
    pub fn set_horizontal_vane(&mut self, wide_vane: HorizontalVane) -> Result<(), DeviceError> {
        let device = self.engine.device_mut();
        device.set_wide_vane(wide_vane);
        if let Err(e) = device.update() {
            device.discard();
            return Err(e);
        }
        self.horizontal_vane = wide_vane;
        self.swing_mode = SwingMode::from_device(self.vertical_vane, wide_vane);
        Ok(())
    }

    /// Current climate state
    pub fn state(&self) -> ClimateState {
        ClimateState {
            mode: self.engine.mode(),
            action: self.engine.action(),
            current_temperature: self.engine.current_temperature(),
            target_temperature: self.engine.target_temperature(),
            fan_mode: self.fan_mode,
            swing_mode: self.swing_mode,
            vertical_vane: self.vertical_vane,
            horizontal_vane: self.horizontal_vane,
        }
    }

    pub fn engine(&self) -> &WorkflowEngine<D> {
        &self.engine
    }

    pub fn device(&self) -> &D {
        self.engine.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.engine.device_mut()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Remote temperature in use, if any
    pub fn remote_temperature(&self) -> Option<f32> {
        self.remote.temperature()
    }

    /// Diagnostic text for operators
    pub fn dump_config(&self) -> String<DUMP_CAPACITY> {
        let mut out = String::new();
        let _ = write!(
            out,
            "Heat pump: poll_interval={}ms limits={}..{} step={}\n\
             Saved heat: {} cool: {} auto: {}\n\
             Remote temperature: {}\n\
             Unit: power={:?} room={:?}\n{}",
            self.poll_interval_ms,
            self.limits.min_c,
            self.limits.max_c,
            self.limits.step_c,
            self.setpoints.get(Mode::Heat).unwrap_or(-1.0),
            self.setpoints.get(Mode::Cool).unwrap_or(-1.0),
            self.setpoints.get(Mode::HeatCool).unwrap_or(-1.0),
            self.remote.temperature().unwrap_or(0.0),
            self.engine.device().power_on(),
            self.engine.device().current_temperature(),
            self.engine.dump_config(),
        );
        out
    }
}
