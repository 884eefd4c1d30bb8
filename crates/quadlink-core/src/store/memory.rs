//! In-memory store for tests and link-less operation

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{StateStore, StoreKey, StoredValue};
use crate::Result;

/// A [`StateStore`] backed by a locked hash map. Contents vanish with the
/// process; useful in tests and anywhere durability is not required.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<StoreKey, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, key: StoreKey, value: &StoredValue) -> Result<()> {
        self.map.lock().insert(key, value.clone());
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<StoredValue>> {
        Ok(self.map.lock().get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::PositionVector;
    use crate::store::ModeFlags;

    #[test]
    fn test_missing_key_is_absent_not_error() {
        let store = MemoryStore::new();
        assert_eq!(store.load(StoreKey::Previous).unwrap(), None);
        assert_eq!(store.load_positions(StoreKey::Current).unwrap(), None);
    }

    #[test]
    fn test_save_overwrites_whole_value() {
        let store = MemoryStore::new();
        let a = PositionVector::default();
        let b = PositionVector::new([0, 180, 0, 180, 0, 0, 180, 0]).unwrap();

        store.save(StoreKey::Current, &StoredValue::Positions(a)).unwrap();
        store.save(StoreKey::Current, &StoredValue::Positions(b)).unwrap();
        assert_eq!(store.load_positions(StoreKey::Current).unwrap(), Some(b));
    }

    #[test]
    fn test_typed_load_rejects_wrong_shape() {
        let store = MemoryStore::new();
        store
            .save(StoreKey::Current, &StoredValue::Flags(ModeFlags::default()))
            .unwrap();
        assert!(store.load_positions(StoreKey::Current).is_err());
    }
}
