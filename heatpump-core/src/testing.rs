//! Test doubles shared by the unit tests

use std::vec::Vec;

use crate::climate::{DeviceMode, FanSpeed, HorizontalVane, VerticalVane};
use crate::traits::{
    DeviceError, HeatPumpDevice, HeatPumpSettings, HeatPumpStatus, SetpointSlot,
    SetpointStorage, StorageError,
};

pub(crate) fn test_settings(power: bool, mode: DeviceMode, temperature: f32) -> HeatPumpSettings {
    HeatPumpSettings {
        power,
        mode,
        temperature,
        fan: FanSpeed::Auto,
        vane: VerticalVane::Auto,
        wide_vane: HorizontalVane::Center,
    }
}

/// Unit that applies every committed change instantly
pub(crate) struct MockDevice {
    pub settings: Option<HeatPumpSettings>,
    pub status: Option<HeatPumpStatus>,
    staged: HeatPumpSettings,
    pub fail_updates: bool,
    pub fail_sync: bool,
    pub commits: u32,
    pub discards: u32,
    pub syncs: u32,
    pub power_commands: Vec<bool>,
    pub temperature_commands: Vec<f32>,
    pub remote_temperatures: Vec<f32>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            settings: None,
            status: None,
            staged: test_settings(false, DeviceMode::Heat, 20.0),
            fail_updates: false,
            fail_sync: false,
            commits: 0,
            discards: 0,
            syncs: 0,
            power_commands: Vec::new(),
            temperature_commands: Vec::new(),
            remote_temperatures: Vec::new(),
        }
    }

    /// Unit that has already reported both snapshots
    pub fn reporting(power: bool, mode: DeviceMode, setpoint: f32, room: f32) -> Self {
        let mut device = Self::new();
        device.report_settings(test_settings(power, mode, setpoint));
        device.report_status(room, false);
        device
    }

    pub fn report_settings(&mut self, settings: HeatPumpSettings) {
        self.settings = Some(settings);
        self.staged = settings;
    }

    pub fn report_status(&mut self, room_temperature: f32, operating: bool) {
        self.status = Some(HeatPumpStatus {
            room_temperature,
            operating,
        });
    }
}

impl HeatPumpDevice for MockDevice {
    fn settings(&self) -> Option<HeatPumpSettings> {
        self.settings
    }

    fn status(&self) -> Option<HeatPumpStatus> {
        self.status
    }

    fn set_power(&mut self, on: bool) {
        self.power_commands.push(on);
        self.staged.power = on;
    }

    fn set_mode(&mut self, mode: DeviceMode) {
        self.staged.mode = mode;
    }

    fn set_temperature(&mut self, temperature_c: f32) {
        self.temperature_commands.push(temperature_c);
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
        self.remote_temperatures.push(temperature_c);
        Ok(())
    }

    fn sync(&mut self) -> Result<(), DeviceError> {
        self.syncs += 1;
        if self.fail_sync {
            return Err(DeviceError::Timeout);
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), DeviceError> {
        if self.fail_updates {
            return Err(DeviceError::NotAcknowledged);
        }
        self.commits += 1;
        self.settings = Some(self.staged);
        Ok(())
    }

    fn discard(&mut self) {
        self.discards += 1;
        if let Some(settings) = self.settings {
            self.staged = settings;
        }
    }
}

/// Setpoint storage held in memory
#[derive(Default)]
pub(crate) struct MemoryStorage {
    pub slots: [Option<u8>; 4],
    pub saves: u32,
    pub corrupted: bool,
}

impl SetpointStorage for MemoryStorage {
    fn load(&mut self, slot: SetpointSlot) -> Result<Option<u8>, StorageError> {
        if self.corrupted {
            return Err(StorageError::Corrupted);
        }
        Ok(self.slots[slot as usize])
    }

    fn save(&mut self, slot: SetpointSlot, steps: u8) -> Result<(), StorageError> {
        self.saves += 1;
        self.slots[slot as usize] = Some(steps);
        Ok(())
    }
}
