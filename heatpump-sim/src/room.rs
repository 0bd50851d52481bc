//! Simulated room and indoor unit
//!
//! The room is a single thermal mass leaking towards the outdoor
//! temperature. The unit pushes it towards its setpoint at a rate
//! proportional to the setpoint error, up to its capacity.

use heatpump_core::climate::{DeviceMode, FanSpeed, HorizontalVane, VerticalVane};
use heatpump_core::traits::{DeviceError, HeatPumpDevice, HeatPumpSettings, HeatPumpStatus};
use log::{debug, trace};

use crate::config::{RoomConfig, UnitConfig};

const MS_PER_MINUTE: f32 = 60_000.0;

/// Below this rate the compressor counts as idle (°C/min)
const OPERATING_THRESHOLD: f32 = 0.01;

/// Lumped thermal model of one room
#[derive(Debug, Clone)]
pub struct RoomModel {
    config: RoomConfig,
    temperature_c: f32,
}

impl RoomModel {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            temperature_c: config.initial_c,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    /// Rate the unit adds for a setpoint and mode (°C/min, negative cools)
    pub fn unit_rate(&self, mode: DeviceMode, setpoint_c: f32) -> f32 {
        let error = setpoint_c - self.temperature_c;
        let max = self.config.max_rate_per_min;
        let rate = (error * self.config.capacity_per_min).max(-max).min(max);
        match mode {
            DeviceMode::Heat => rate.max(0.0),
            DeviceMode::Cool => rate.min(0.0),
            // Drying removes some heat along with the moisture
            DeviceMode::Dry => rate.min(0.0) * 0.5,
            DeviceMode::Auto => rate,
            DeviceMode::Fan => 0.0,
        }
    }

    /// Advance the model by `dt_ms` with the unit adding `unit_rate` °C/min
    pub fn step(&mut self, dt_ms: u64, unit_rate: f32) {
        let dt_min = dt_ms as f32 / MS_PER_MINUTE;
        let loss = (self.config.outdoor_c - self.temperature_c) * self.config.loss_per_min;
        self.temperature_c += (loss + unit_rate) * dt_min;
    }
}

/// Indoor unit driving a [`RoomModel`]
///
/// Staged changes apply on commit. Snapshots are only refreshed by
/// [`sync`](HeatPumpDevice::sync), so the controller sees the unit as it
/// was at the last poll.
pub struct SimulatedHeatPump {
    room: RoomModel,
    applied: HeatPumpSettings,
    staged: HeatPumpSettings,
    settings: Option<HeatPumpSettings>,
    status: Option<HeatPumpStatus>,
    remote_c: Option<f32>,
    operating: bool,
    fail_commit_every: Option<u32>,
    commits: u32,
    failed_commits: u32,
}

impl SimulatedHeatPump {
    pub fn new(room: RoomConfig, unit: UnitConfig) -> Self {
        let settings = HeatPumpSettings {
            power: unit.initial_power,
            mode: DeviceMode::Heat,
            temperature: unit.initial_setpoint_c,
            fan: FanSpeed::Auto,
            vane: VerticalVane::Auto,
            wide_vane: HorizontalVane::Center,
        };
        Self {
            room: RoomModel::new(room),
            applied: settings,
            staged: settings,
            settings: None,
            status: None,
            remote_c: None,
            operating: false,
            fail_commit_every: unit.fail_commit_every.filter(|&n| n > 0),
            commits: 0,
            failed_commits: 0,
        }
    }

    /// Advance the room by `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        let rate = if self.applied.power {
            self.room.unit_rate(self.applied.mode, self.applied.temperature)
        } else {
            0.0
        };
        self.operating = rate.abs() > OPERATING_THRESHOLD;
        self.room.step(dt_ms, rate);
        trace!(
            "Room {} rate {} operating {}",
            self.room.temperature(),
            rate,
            self.operating
        );
    }

    pub fn room(&self) -> &RoomModel {
        &self.room
    }

    /// Settings currently in effect on the unit
    pub fn applied(&self) -> &HeatPumpSettings {
        &self.applied
    }

    /// Remote temperature the unit is using, if any
    pub fn remote_temperature(&self) -> Option<f32> {
        self.remote_c
    }

    pub fn failed_commits(&self) -> u32 {
        self.failed_commits
    }
}

impl HeatPumpDevice for SimulatedHeatPump {
    fn settings(&self) -> Option<HeatPumpSettings> {
        self.settings
    }

    fn status(&self) -> Option<HeatPumpStatus> {
        self.status
    }

    fn set_power(&mut self, on: bool) {
        self.staged.power = on;
    }

    fn set_mode(&mut self, mode: DeviceMode) {
        self.staged.mode = mode;
    }

    fn set_temperature(&mut self, temperature_c: f32) {
        self.staged.temperature = temperature_c;
    }

    fn set_fan_speed(&mut self, speed: FanSpeed) {
        self.staged.fan = speed;
    }

    fn set_vane(&mut self, vane: VerticalVane) {
        self.staged.vane = vane;
    }

    fn set_wide_vane(&mut self, wide_vane: HorizontalVane) {
        self.staged.wide_vane = wide_vane;
    }

    fn set_remote_temperature(&mut self, temperature_c: f32) -> Result<(), DeviceError> {
        self.remote_c = if temperature_c > 0.0 {
            Some(temperature_c)
        } else {
            None
        };
        Ok(())
    }

    fn sync(&mut self) -> Result<(), DeviceError> {
        self.settings = Some(self.applied);
        self.status = Some(HeatPumpStatus {
            room_temperature: self.remote_c.unwrap_or(self.room.temperature()),
            operating: self.operating,
        });
        Ok(())
    }

    fn update(&mut self) -> Result<(), DeviceError> {
        self.commits += 1;
        if let Some(every) = self.fail_commit_every {
            if self.commits % every == 0 {
                self.failed_commits += 1;
                debug!("Dropping commit {}", self.commits);
                return Err(DeviceError::NotAcknowledged);
            }
        }
        self.applied = self.staged;
        Ok(())
    }

    fn discard(&mut self) {
        self.staged = self.applied;
    }
}
