#![doc(test(attr(deny(warnings))))]

//! Billflow Core projects recurring bills forward over a time window,
//! tracking the expected and actual account balance and the extra payment
//! needed to keep the two aligned.

pub mod config;
pub mod errors;
pub mod ledger;
pub mod projection;
pub mod storage;
pub mod time;
pub mod utils;

pub use errors::{ConfigError, ProjectionError, StoreError};
pub use ledger::{Bill, Frequency, Occurrence, Settings};
pub use projection::{build_projection, ProjectionEngine, ProjectionResult};
pub use storage::{JsonHistoryStore, MemoryHistoryStore, ProjectionHistoryStore};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Billflow Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
