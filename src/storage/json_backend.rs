use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::warn;

use crate::{errors::StoreError, ledger::Bill, projection::ProjectionResult};

use super::{prepend_bounded, ProjectionHistoryStore, Result};

const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON history of recent projections.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the persisted history, if any.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("history lock poisoned".into()))
    }

    fn read(&self) -> Result<Vec<ProjectionResult>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl ProjectionHistoryStore for JsonHistoryStore {
    fn get(&self) -> Result<Vec<ProjectionResult>> {
        let _guard = self.lock()?;
        self.read()
    }

    fn push(&self, result: ProjectionResult) -> Result<()> {
        let _guard = self.lock()?;
        let mut history = match self.read() {
            Ok(history) => history,
            Err(StoreError::Serde(err)) => {
                warn!(path = %self.path.display(), error = %err, "discarding unreadable projection history");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        prepend_bounded(&mut history, result);
        save_json_to_path(&history, &self.path)
    }
}

/// Loads the bill list stored at `path`; a missing file is an empty list.
pub fn load_bills_from_path(path: &Path) -> Result<Vec<Bill>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Writes the bill list to `path` atomically.
pub fn save_bills_to_path(bills: &[Bill], path: &Path) -> Result<()> {
    save_json_to_path(bills, path)
}

fn save_json_to_path<T: serde::Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
