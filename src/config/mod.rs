//! Process configuration, built once at startup and passed down explicitly.
//!
//! Everything comes from environment variables (a `.env` file is loaded by the
//! binary in dev), except that the classifier section can be read from a JSON
//! file named by `CLASSIFIER_CONFIG_PATH`. Missing or unparsable values fall back to defaults with a log
//! line; nothing here panics.

pub mod classifier;

use std::{env, fmt, str::FromStr};

use tracing::{info, warn};

pub use classifier::{ClassifierConfig, ClassifierMode};

// --- env names ---
pub const ENV_CLASSIFIER_MODE: &str = "CLASSIFIER_MODE";
pub const ENV_CLASSIFIER_URL: &str = "CLASSIFIER_URL";
pub const ENV_CLASSIFIER_TIMEOUT_MS: &str = "CLASSIFIER_TIMEOUT_MS";
pub const ENV_CLASSIFIER_CONFIG_PATH: &str = "CLASSIFIER_CONFIG_PATH";
pub const ENV_HF_TOKEN: &str = "HUGGING_FACE_TOKEN";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_HISTORY_LIMIT: &str = "HISTORY_LIMIT";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Where journal entries live.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process-local store; contents are lost on restart.
    Memory,
    /// Supabase (PostgREST) table `mood_entries`.
    Supabase { url: String, anon_key: String },
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Memory => f.write_str("Memory"),
            StoreConfig::Supabase { url, anon_key } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("key_len", &anon_key.len())
                .finish(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let url = env::var(ENV_SUPABASE_URL).unwrap_or_default();
        let key = env::var(ENV_SUPABASE_KEY).unwrap_or_default();
        match (url.trim(), key.trim()) {
            ("", "") => {
                info!("{ENV_SUPABASE_URL} not set, using in-memory journal store");
                StoreConfig::Memory
            }
            (url, key) if !url.is_empty() && !key.is_empty() => StoreConfig::Supabase {
                url: url.to_string(),
                anon_key: key.to_string(),
            },
            _ => {
                warn!(
                    "Only one of {ENV_SUPABASE_URL}/{ENV_SUPABASE_KEY} is set, using in-memory journal store"
                );
                StoreConfig::Memory
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
    /// Max entries returned by the history endpoint.
    pub history_limit: usize,
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            store: StoreConfig::Memory,
            history_limit: DEFAULT_HISTORY_LIMIT,
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let history_limit = match env_or(ENV_HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT) {
            0 => DEFAULT_HISTORY_LIMIT,
            n => n,
        };
        Self {
            classifier: ClassifierConfig::from_env(),
            store: StoreConfig::from_env(),
            history_limit,
            metrics_enabled: env::var(ENV_METRICS_ENABLED)
                .ok()
                .is_some_and(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true")),
        }
    }
}

/// Parse `key` from the environment or return `default`.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Err(_) => default,
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Invalid {key} value ({e}), using default");
                default
            }
        },
    }
}
