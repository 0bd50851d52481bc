//! Per-mode setpoint memory
//!
//! Heat, cool and auto each keep the last setpoint used in that mode, so
//! switching modes restores it. Values persist as one byte per slot: the
//! number of temperature steps above the lowest settable temperature.

use crate::climate::Mode;
use crate::config::TemperatureLimits;
use crate::traits::{SetpointSlot, SetpointStorage, StorageError};

/// Storage slot for a mode, `None` for modes without a setpoint
pub fn slot_for(mode: Mode) -> Option<SetpointSlot> {
    if !mode.has_setpoint() {
        return None;
    }
    match mode {
        Mode::Heat => Some(SetpointSlot::Heat),
        Mode::Cool => Some(SetpointSlot::Cool),
        _ => Some(SetpointSlot::Auto),
    }
}

/// Remembered setpoints
#[derive(Debug, Clone)]
pub struct SetpointMemory {
    limits: TemperatureLimits,
    heat: Option<f32>,
    cool: Option<f32>,
    auto: Option<f32>,
}

impl SetpointMemory {
    pub fn new(limits: TemperatureLimits) -> Self {
        Self {
            limits,
            heat: None,
            cool: None,
            auto: None,
        }
    }

    fn entry(&mut self, slot: SetpointSlot) -> &mut Option<f32> {
        match slot {
            SetpointSlot::Heat => &mut self.heat,
            SetpointSlot::Cool => &mut self.cool,
            SetpointSlot::Auto => &mut self.auto,
        }
    }

    /// Encode a temperature as steps above the minimum, truncating
    pub fn encode(&self, value_c: f32) -> u8 {
        let steps = (self.limits.clamp(value_c) - self.limits.min_c) / self.limits.step_c;
        // Float to int casts saturate
        steps as u8
    }

    pub fn decode(&self, steps: u8) -> f32 {
        self.limits.min_c + steps as f32 * self.limits.step_c
    }

    /// Restore all slots from storage
    ///
    /// Slots that fail to load stay empty.
    pub fn load<S: SetpointStorage>(&mut self, storage: &mut S) {
        for slot in [SetpointSlot::Cool, SetpointSlot::Heat, SetpointSlot::Auto] {
            let value = match storage.load(slot) {
                Ok(steps) => steps.map(|s| self.decode(s)),
                Err(e) => {
                    warn!("Setpoint slot {:?} not loaded: {:?}", slot, e);
                    None
                }
            };
            *self.entry(slot) = value;
        }
    }

    /// Remembered setpoint for a mode
    pub fn get(&self, mode: Mode) -> Option<f32> {
        match slot_for(mode)? {
            SetpointSlot::Heat => self.heat,
            SetpointSlot::Cool => self.cool,
            SetpointSlot::Auto => self.auto,
        }
    }

    /// Remember the setpoint for a mode, saving it if it changed
    ///
    /// Returns whether storage was written.
    pub fn remember<S: SetpointStorage>(
        &mut self,
        storage: &mut S,
        mode: Mode,
        value_c: f32,
    ) -> Result<bool, StorageError> {
        let slot = match slot_for(mode) {
            Some(slot) => slot,
            None => return Ok(false),
        };
        let entry = self.entry(slot);
        if *entry == Some(value_c) {
            return Ok(false);
        }
        *entry = Some(value_c);

        let steps = self.encode(value_c);
        storage.save(slot, steps)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;

    #[test]
    fn test_encode_truncates_steps() {
        let memory = SetpointMemory::new(TemperatureLimits::default());
        assert_eq!(memory.encode(16.0), 0);
        assert_eq!(memory.encode(21.5), 11);
        assert_eq!(memory.encode(21.7), 11);
        assert_eq!(memory.encode(31.0), 30);
        assert_eq!(memory.decode(11), 21.5);
    }

    #[test]
    fn test_remember_saves_only_on_change() {
        let mut storage = MemoryStorage::default();
        let mut memory = SetpointMemory::new(TemperatureLimits::default());

        assert_eq!(memory.remember(&mut storage, Mode::Heat, 22.0), Ok(true));
        assert_eq!(memory.remember(&mut storage, Mode::Heat, 22.0), Ok(false));
        assert_eq!(storage.saves, 1);
        assert_eq!(storage.slots[SetpointSlot::Heat as usize], Some(12));
    }

    #[test]
    fn test_slot_for_matches_setpoint_modes() {
        for row in crate::climate::MODE_TABLE.iter() {
            assert_eq!(slot_for(row.mode).is_some(), row.mode.has_setpoint());
        }
        assert_eq!(slot_for(Mode::HeatCool), Some(SetpointSlot::Auto));
    }

    #[test]
    fn test_modes_without_setpoint_ignored() {
        let mut storage = MemoryStorage::default();
        let mut memory = SetpointMemory::new(TemperatureLimits::default());

        assert_eq!(memory.remember(&mut storage, Mode::Dry, 22.0), Ok(false));
        assert_eq!(memory.get(Mode::FanOnly), None);
        assert_eq!(storage.saves, 0);
    }

    #[test]
    fn test_load_restores_slots() {
        let mut storage = MemoryStorage::default();
        storage.slots[SetpointSlot::Cool as usize] = Some(14);
        storage.slots[SetpointSlot::Auto as usize] = Some(8);

        let mut memory = SetpointMemory::new(TemperatureLimits::default());
        memory.load(&mut storage);
        assert_eq!(memory.get(Mode::Cool), Some(23.0));
        assert_eq!(memory.get(Mode::HeatCool), Some(20.0));
        assert_eq!(memory.get(Mode::Heat), None);
    }

    #[test]
    fn test_corrupted_storage_leaves_slots_empty() {
        let mut storage = MemoryStorage {
            corrupted: true,
            ..Default::default()
        };
        let mut memory = SetpointMemory::new(TemperatureLimits::default());
        memory.load(&mut storage);
        assert_eq!(memory.get(Mode::Heat), None);
    }
}
