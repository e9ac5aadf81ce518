use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{errors::ConfigError, ledger::Settings, storage::JsonHistoryStore};

const DEFAULT_DIR_NAME: &str = ".billflow";
const HOME_ENV: &str = "BILLFLOW_HOME";
const SETTINGS_FILE: &str = "settings.json";
const BILLS_FILE: &str = "bills.json";
const HISTORY_FILE: &str = "schedules.json";
const TMP_SUFFIX: &str = "tmp";

/// File layout of the application data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `BILLFLOW_HOME`, defaulting to `~/.billflow`.
    pub fn resolve() -> Self {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return Self::new(custom);
        }
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(DEFAULT_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn bills_file(&self) -> PathBuf {
        self.root.join(BILLS_FILE)
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn history_store(&self) -> JsonHistoryStore {
        JsonHistoryStore::new(self.history_file())
    }
}

/// Loads and saves the active projection [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_paths(paths: &AppPaths) -> Self {
        Self::new(paths.settings_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored settings, or defaults when none have been saved.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved settings, using defaults");
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Deletes the saved settings so the next `load` returns defaults.
    pub fn reset(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
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

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
