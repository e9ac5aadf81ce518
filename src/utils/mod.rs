use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "billflow_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Rounds a monetary value to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
