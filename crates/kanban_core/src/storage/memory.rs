//! In-memory slot storage.
//!
//! Stands in for durable storage in tests and ephemeral sessions. An optional
//! byte quota reproduces "storage full" write failures.

use super::{SlotStorage, StorageError, StorageResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, Vec<u8>>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose slots together may hold at most `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Pre-populates one slot, bypassing the quota.
    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    /// Changes the quota for subsequent writes.
    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    fn bytes_excluding(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(slot, _)| slot.as_str() != key)
            .map(|(_, value)| value.len())
            .sum()
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            let requested = self.bytes_excluding(key) + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested,
                    quota,
                });
            }
        }
        self.slots.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
