//! Hardware abstraction traits
//!
//! These traits define the interface between the climate logic and the
//! serial link to the indoor unit or the persistent storage of a board.

pub mod device;
pub mod storage;

pub use device::{DeviceError, HeatPumpDevice, HeatPumpSettings, HeatPumpStatus};
pub use storage::{SetpointSlot, SetpointStorage, StorageError};
