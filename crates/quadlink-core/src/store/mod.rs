//! Durable key/value snapshot storage
//!
//! The controller persists named state snapshots (the `current` and
//! `previous` position vectors and the latched mode flags) through the
//! [`StateStore`] seam. Values round-trip through JSON integer-exactly; a
//! missing key is a normal absent result, never an error. Each store call
//! is a critical section: backends hold a lock for the duration, so a
//! concurrent load can never observe a partial write.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::joints::PositionVector;
use crate::{Error, Result};

/// Stable persistence keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Latest saved position vector
    Current,
    /// The position vector `Current` held before its last rotation;
    /// the single level of undo history
    Previous,
    /// Latched UI/robot mode flags
    ButtonStates,
}

impl StoreKey {
    /// Stable string form, used for backend addressing (e.g. file names)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Current => "current",
            StoreKey::Previous => "previous",
            StoreKey::ButtonStates => "button_states",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latched boolean mode toggles, independent of angle data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// True while the robot is in the sit pose
    pub sit_stand: bool,
    /// True while a wave sequence is playing
    pub waving: bool,
}

/// One stored value: a position vector (JSON array) or mode flags
/// (JSON object). Untagged, so the on-disk shape stays exactly what the
/// original state files held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Positions(PositionVector),
    Flags(ModeFlags),
}

/// Key/value storage for named state snapshots.
///
/// `save` overwrites the whole value under a key; `load` returns `Ok(None)`
/// for a key never written. Implementations serialize each call under a
/// lock so save/load on the same store never interleave.
pub trait StateStore: Send {
    /// Overwrite the value stored under `key`
    fn save(&self, key: StoreKey, value: &StoredValue) -> Result<()>;

    /// Load the value stored under `key`, `Ok(None)` if absent
    fn load(&self, key: StoreKey) -> Result<Option<StoredValue>>;

    /// Load a key expected to hold a position vector
    fn load_positions(&self, key: StoreKey) -> Result<Option<PositionVector>> {
        match self.load(key)? {
            None => Ok(None),
            Some(StoredValue::Positions(p)) => Ok(Some(p)),
            Some(_) => Err(Error::Persistence(format!(
                "key {} does not hold a position vector",
                key
            ))),
        }
    }

    /// Load a key expected to hold mode flags
    fn load_flags(&self, key: StoreKey) -> Result<Option<ModeFlags>> {
        match self.load(key)? {
            None => Ok(None),
            Some(StoredValue::Flags(f)) => Ok(Some(f)),
            Some(_) => Err(Error::Persistence(format!(
                "key {} does not hold mode flags",
                key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_value_shapes() {
        let positions = StoredValue::Positions(PositionVector::default());
        assert_eq!(
            serde_json::to_string(&positions).unwrap(),
            "[90,90,90,90,90,90,90,90]"
        );

        let flags = StoredValue::Flags(ModeFlags {
            sit_stand: true,
            waving: false,
        });
        assert_eq!(
            serde_json::to_string(&flags).unwrap(),
            r#"{"sit_stand":true,"waving":false}"#
        );
    }

    #[test]
    fn test_stored_value_untagged_roundtrip() {
        let v: StoredValue = serde_json::from_str("[0,180,0,180,0,0,180,0]").unwrap();
        assert!(matches!(v, StoredValue::Positions(_)));

        let f: StoredValue = serde_json::from_str(r#"{"sit_stand":false,"waving":true}"#).unwrap();
        assert_eq!(
            f,
            StoredValue::Flags(ModeFlags {
                sit_stand: false,
                waving: true
            })
        );
    }
}
