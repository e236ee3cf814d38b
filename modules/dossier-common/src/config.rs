use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::{DossierError, Result};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Runtime knobs loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Liveness
    pub liveness_timeout: Duration,
    pub liveness_concurrency: usize,
    pub user_agent: String,
    pub curl_bin: String,

    // Scraping
    pub extract_timeout: Duration,

    // Ranking
    pub url_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            liveness_timeout: Duration::from_secs(5),
            liveness_concurrency: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            curl_bin: "curl".to_string(),
            extract_timeout: Duration::from_secs(20),
            url_limit: 12,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    /// for anything unset. Unparsable values are an error, not a silent default.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            liveness_timeout: Duration::from_secs(parsed_env(
                "DOSSIER_LIVENESS_TIMEOUT_SECS",
                defaults.liveness_timeout.as_secs(),
            )?),
            liveness_concurrency: parsed_env(
                "DOSSIER_LIVENESS_CONCURRENCY",
                defaults.liveness_concurrency,
            )?
            .max(1),
            user_agent: env::var("DOSSIER_USER_AGENT").unwrap_or(defaults.user_agent),
            curl_bin: env::var("CURL_BIN").unwrap_or(defaults.curl_bin),
            extract_timeout: Duration::from_secs(parsed_env(
                "DOSSIER_EXTRACT_TIMEOUT_SECS",
                defaults.extract_timeout.as_secs(),
            )?),
            url_limit: parsed_env("DOSSIER_URL_LIMIT", defaults.url_limit)?,
        })
    }

    pub fn log_summary(&self) {
        info!(
            liveness_timeout_secs = self.liveness_timeout.as_secs(),
            liveness_concurrency = self.liveness_concurrency,
            extract_timeout_secs = self.extract_timeout.as_secs(),
            url_limit = self.url_limit,
            curl_bin = self.curl_bin.as_str(),
            "Dossier config loaded"
        );
    }
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DossierError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}
