#![allow(dead_code)]

use std::sync::Mutex;

use billflow_core::{
    config::{AppPaths, SettingsManager},
    time::FixedClock,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory and a settings manager rooted in it.
pub fn setup_test_env() -> (AppPaths, SettingsManager) {
    let temp = TempDir::new().expect("create temp dir");
    let paths = AppPaths::new(temp.path());
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let settings = SettingsManager::from_paths(&paths);
    (paths, settings)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

pub fn clock_on(y: i32, m: u32, d: u32) -> FixedClock {
    FixedClock::at_date(date(y, m, d))
}
