//! Tracing bootstrap. `RUST_LOG` always wins; the configured filter is only
//! the fallback when the variable is absent.

use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("log filter directive '{directive}' is not valid")]
    Filter {
        directive: String,
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the process-wide subscriber. Safe to call exactly once; a second
/// call reports `AlreadyInitialized` instead of panicking.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|source| TelemetryError::Filter {
            directive: config.log_filter.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_rejects_a_bad_filter_directive() {
        // The filter is built before any subscriber is installed, so probing
        // the error path leaves the global dispatcher untouched.
        env_lock::with_removed_rust_log(|| {
            let config = TelemetryConfig {
                log_filter: "mealbridge=notalevel".to_string(),
            };
            match init(&config) {
                Err(TelemetryError::Filter { directive, .. }) => {
                    assert_eq!(directive, "mealbridge=notalevel");
                }
                other => panic!("expected Filter error, got {other:?}"),
            }
        });
    }

    mod env_lock {
        use std::env;
        use std::sync::{Mutex, OnceLock};

        // RUST_LOG shadows the configured directive, so it has to be held
        // out of the way while the fallback path is exercised.
        pub(super) fn with_removed_rust_log(body: impl FnOnce()) {
            static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
            let _lock = GUARD
                .get_or_init(|| Mutex::new(()))
                .lock()
                .expect("env mutex poisoned");
            let saved = env::var("RUST_LOG").ok();
            env::remove_var("RUST_LOG");
            body();
            if let Some(value) = saved {
                env::set_var("RUST_LOG", value);
            }
        }
    }
}
