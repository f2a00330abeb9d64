use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::SectionsError;

/// Durable key-value slot holding the serialized sections.
///
/// Records are opaque to the backend; decoding happens in the store so a
/// single malformed record can be skipped without losing the rest.
pub trait SectionStorage: Send {
    fn load(&self) -> Result<Vec<Value>, SectionsError>;

    fn save(&self, records: &[Value]) -> Result<(), SectionsError>;
}

/// In-process storage. Clones share the same slot, so a test can keep one
/// handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: Vec<Value>,
    writes: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Value>) -> Self {
        let storage = Self::default();
        storage.lock().records = records;
        storage
    }

    pub fn records(&self) -> Vec<Value> {
        self.lock().records.clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SectionStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Value>, SectionsError> {
        let inner = self.lock();
        if inner.fail_loads {
            return Err(SectionsError::Unavailable(String::from(
                "memory storage load disabled",
            )));
        }

        Ok(inner.records.clone())
    }

    fn save(&self, records: &[Value]) -> Result<(), SectionsError> {
        let mut inner = self.lock();
        if inner.fail_saves {
            return Err(SectionsError::Unavailable(String::from(
                "memory storage save disabled",
            )));
        }

        inner.records = records.to_vec();
        inner.writes += 1;
        Ok(())
    }
}
