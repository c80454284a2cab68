// src/config.rs
// Engine configuration, loaded from the environment or built in code.
// The config is passed into FeedAggregator explicitly; the core never
// reads ambient/global state.

use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Items requested per page.
    pub page_size: u32,
    /// Skip incoming items whose id is already present in the aggregate.
    pub dedupe: bool,
    /// Per-request timeout for the bundled HTTP fetcher, in seconds.
    pub request_timeout_secs: u64,
    /// Log level for the demo binary ("info", "debug", ...).
    pub log_level: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            dedupe: true,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_size: env_var_or("PAGEFEED_PAGE_SIZE", defaults.page_size),
            dedupe: env_var_or("PAGEFEED_DEDUPE", defaults.dedupe),
            request_timeout_secs: env_var_or(
                "PAGEFEED_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            log_level: env_var_or("PAGEFEED_LOG_LEVEL", defaults.log_level),
        }
    }
}

/// Parse an environment variable, tolerating trailing comments and
/// whitespace; fall back to the default on absence or parse failure.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}
