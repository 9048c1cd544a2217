//! Tracing initialization.

use std::sync::Once;

use potato_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Per-target filter, e.g. `POTATO_LOG=potato_assignment=debug,info`.
pub const LOG_ENV_VAR: &str = "POTATO_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. `POTATO_LOG` wins over
/// `config.log_level`; an invalid level falls back to `info`.
///
/// Idempotent. If another subscriber is already installed it is kept.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let installed = if config.json {
            tracing_subscriber::registry()
                .with(layer.json())
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry().with(layer).with(filter).try_init()
        };
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
}
