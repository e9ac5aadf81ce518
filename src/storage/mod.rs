pub mod json_backend;

pub use json_backend::{load_bills_from_path, save_bills_to_path, JsonHistoryStore};

use std::sync::{Mutex, MutexGuard};

use crate::{errors::StoreError, projection::ProjectionResult};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Number of projections retained by history stores.
pub const HISTORY_CAPACITY: usize = 3;

/// Bounded, most-recent-first history of projection results.
///
/// `push` is a read-modify-write and implementations must run it as a single
/// critical section.
pub trait ProjectionHistoryStore: Send + Sync {
    /// Returns the stored results, newest first.
    fn get(&self) -> Result<Vec<ProjectionResult>>;

    /// Prepends `result` and drops anything beyond [`HISTORY_CAPACITY`].
    fn push(&self, result: ProjectionResult) -> Result<()>;

    fn latest(&self) -> Result<Option<ProjectionResult>> {
        Ok(self.get()?.into_iter().next())
    }
}

/// Applies the prepend-and-truncate policy shared by all stores.
pub fn prepend_bounded(history: &mut Vec<ProjectionResult>, result: ProjectionResult) {
    history.insert(0, result);
    history.truncate(HISTORY_CAPACITY);
}

/// In-process history store.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<ProjectionResult>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ProjectionResult>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("history lock poisoned".into()))
    }
}

impl ProjectionHistoryStore for MemoryHistoryStore {
    fn get(&self) -> Result<Vec<ProjectionResult>> {
        Ok(self.lock()?.clone())
    }

    fn push(&self, result: ProjectionResult) -> Result<()> {
        let mut entries = self.lock()?;
        prepend_bounded(&mut entries, result);
        Ok(())
    }
}
