//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
const DEFAULT_FILTER: &str = "mood_journal=info,sentiment=info,journal=info,warn";

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
/// The filter comes from `RUST_LOG` when set.
///
/// Returns `false` when another subscriber was already installed; that one
/// stays in effect and a warning is emitted through it.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("json"));

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    match installed {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "tracing subscriber already installed; {ENV_LOG_FORMAT} and default filter not applied"
            );
            false
        }
    }
}
