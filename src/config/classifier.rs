// src/config/classifier.rs
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, str::FromStr};

use tracing::{info, warn};

use super::{
    env_or, ENV_CLASSIFIER_CONFIG_PATH, ENV_CLASSIFIER_MODE, ENV_CLASSIFIER_TIMEOUT_MS,
    ENV_CLASSIFIER_URL, ENV_HF_TOKEN,
};

pub const DEFAULT_CLASSIFIER_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn default_endpoint() -> String {
    format!("https://api-inference.huggingface.co/models/{DEFAULT_CLASSIFIER_MODEL}")
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Which classifier the scorer talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// HTTP inference endpoint.
    #[default]
    Remote,
    /// Deterministic in-process classifier (local runs, tests).
    Mock,
    /// No classifier; every call uses the keyword fallback.
    Offline,
}

impl FromStr for ClassifierMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "mock" => Ok(Self::Mock),
            "offline" | "off" | "disabled" => Ok(Self::Offline),
            other => anyhow::bail!("unknown classifier mode: {other}"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub mode: ClassifierMode,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// "ENV" means: read from HUGGING_FACE_TOKEN
    #[serde(default)]
    pub api_token: String,
    /// Whole-request timeout; expiry counts as a remote failure.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::default(),
            endpoint: default_endpoint(),
            api_token: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// Never print the token itself, only its length.
impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint)
            .field("token_len", &self.api_token.len())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ClassifierConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// When `CLASSIFIER_CONFIG_PATH` is set the JSON file it names is used
    /// instead; an unreadable file is logged and the env vars apply.
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(ENV_CLASSIFIER_CONFIG_PATH) {
            let path = path.trim();
            if !path.is_empty() {
                match Self::load_from_file(path) {
                    Ok(cfg) => {
                        info!("Loaded classifier config from {path}");
                        return cfg;
                    }
                    Err(e) => warn!("Failed to load classifier config {path}: {e}; using env"),
                }
            }
        }

        let defaults = Self::default();
        Self {
            mode: env_or(ENV_CLASSIFIER_MODE, defaults.mode),
            endpoint: env_or(ENV_CLASSIFIER_URL, defaults.endpoint),
            api_token: std::env::var(ENV_HF_TOKEN).unwrap_or_default(),
            timeout_ms: env_or(ENV_CLASSIFIER_TIMEOUT_MS, defaults.timeout_ms),
        }
        .sanitized()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: ClassifierConfig = serde_json::from_str(data)?;

        // Resolve token if "ENV"
        if cfg.api_token.trim().eq_ignore_ascii_case("env") {
            cfg.api_token = std::env::var(ENV_HF_TOKEN)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_HF_TOKEN} env var"))?;
        }

        Ok(cfg.sanitized())
    }

    /// A zero timeout would fail every call, so it means the default.
    fn sanitized(mut self) -> Self {
        if self.timeout_ms == 0 {
            self.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        self.endpoint = self.endpoint.trim().to_string();
        if self.endpoint.is_empty() {
            self.endpoint = default_endpoint();
        }
        self
    }
}
