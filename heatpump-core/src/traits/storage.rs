//! Setpoint persistence

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors from setpoint storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Slot has never been written
    NotFound,
    /// Stored data failed to decode
    Corrupted,
    /// Underlying medium failed
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "setpoint not stored"),
            StorageError::Corrupted => write!(f, "stored setpoint corrupted"),
            StorageError::Io => write!(f, "storage I/O error"),
        }
    }
}

/// Storage slot of a remembered setpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum SetpointSlot {
    Cool = 1,
    Heat = 2,
    Auto = 3,
}

/// Trait for persisting remembered setpoints
///
/// A setpoint is stored as one byte: the number of temperature steps above
/// the lowest settable temperature.
pub trait SetpointStorage {
    /// Load a slot, `Ok(None)` if it was never written
    fn load(&mut self, slot: SetpointSlot) -> Result<Option<u8>, StorageError>;

    /// Store a slot
    fn save(&mut self, slot: SetpointSlot, steps: u8) -> Result<(), StorageError>;
}
