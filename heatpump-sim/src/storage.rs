//! File-backed setpoint storage
//!
//! All slots live in one postcard-encoded file, rewritten on every save.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use heatpump_core::traits::{SetpointSlot, SetpointStorage, StorageError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Layout version written to the file
const FORMAT_VERSION: u8 = 1;

/// On-disk layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SetpointFile {
    version: u8,
    cool: Option<u8>,
    heat: Option<u8>,
    auto: Option<u8>,
}

impl SetpointFile {
    fn slot_mut(&mut self, slot: SetpointSlot) -> &mut Option<u8> {
        match slot {
            SetpointSlot::Cool => &mut self.cool,
            SetpointSlot::Heat => &mut self.heat,
            SetpointSlot::Auto => &mut self.auto,
        }
    }
}

/// Setpoint storage in a single file
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the file, `None` when it does not exist yet
    fn read(&self) -> Result<Option<SetpointFile>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return Err(StorageError::Io);
            }
        };

        let file: SetpointFile =
            postcard::from_bytes(&bytes).map_err(|_| StorageError::Corrupted)?;
        if file.version != FORMAT_VERSION {
            return Err(StorageError::Corrupted);
        }
        Ok(Some(file))
    }
}

impl SetpointStorage for FileStorage {
    fn load(&mut self, slot: SetpointSlot) -> Result<Option<u8>, StorageError> {
        Ok(self
            .read()?
            .and_then(|mut file| *file.slot_mut(slot)))
    }

    fn save(&mut self, slot: SetpointSlot, steps: u8) -> Result<(), StorageError> {
        // A corrupted file is replaced rather than blocking saves forever
        let mut file = match self.read() {
            Ok(Some(file)) => file,
            Ok(None) | Err(StorageError::Corrupted) => SetpointFile {
                version: FORMAT_VERSION,
                ..Default::default()
            },
            Err(e) => return Err(e),
        };
        *file.slot_mut(slot) = Some(steps);

        let bytes = postcard::to_allocvec(&file).map_err(|_| StorageError::Io)?;
        fs::write(&self.path, &bytes).map_err(|e| {
            warn!("Failed to write {}: {}", self.path.display(), e);
            StorageError::Io
        })?;
        debug!("Saved {} bytes of setpoints to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Setpoint storage that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: SetpointFile,
}

impl MemoryStorage {
    /// Stored steps for a slot
    pub fn slot(&self, slot: SetpointSlot) -> Option<u8> {
        match slot {
            SetpointSlot::Cool => self.slots.cool,
            SetpointSlot::Heat => self.slots.heat,
            SetpointSlot::Auto => self.slots.auto,
        }
    }
}

impl SetpointStorage for MemoryStorage {
    fn load(&mut self, slot: SetpointSlot) -> Result<Option<u8>, StorageError> {
        Ok(self.slot(slot))
    }

    fn save(&mut self, slot: SetpointSlot, steps: u8) -> Result<(), StorageError> {
        *self.slots.slot_mut(slot) = Some(steps);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("heatpump-sim-{}-{}", process::id(), name));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let mut storage = FileStorage::new(temp_path("missing"));
        assert_eq!(storage.load(SetpointSlot::Heat), Ok(None));
    }

    #[test]
    fn test_saved_slots_persist_across_instances() {
        let path = temp_path("persist");
        {
            let mut storage = FileStorage::new(&path);
            storage.save(SetpointSlot::Heat, 11).unwrap();
            storage.save(SetpointSlot::Cool, 14).unwrap();
        }

        let mut storage = FileStorage::new(&path);
        assert_eq!(storage.load(SetpointSlot::Heat), Ok(Some(11)));
        assert_eq!(storage.load(SetpointSlot::Cool), Ok(Some(14)));
        assert_eq!(storage.load(SetpointSlot::Auto), Ok(None));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_garbage_file_is_corrupted_and_replaced_on_save() {
        let path = temp_path("garbage");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();

        let mut storage = FileStorage::new(&path);
        assert_eq!(storage.load(SetpointSlot::Heat), Err(StorageError::Corrupted));

        storage.save(SetpointSlot::Auto, 4).unwrap();
        assert_eq!(storage.load(SetpointSlot::Auto), Ok(Some(4)));
        let _ = fs::remove_file(&path);
    }
}
