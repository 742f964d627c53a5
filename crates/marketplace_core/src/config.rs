//! Runtime configuration for the marketplace core.
//!
//! Values come from the process environment; unset variables fall back to
//! defaults, malformed ones are rejected.

use crate::error::{CoreError, CoreResult};
use crate::logging::default_log_level;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "MARKETPLACE_DB_PATH";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_STORE_TIMEOUT_MS: &str = "MARKETPLACE_STORE_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "MARKETPLACE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MARKETPLACE_LOG_DIR";
pub const ENV_HASH_COST: &str = "MARKETPLACE_HASH_COST";

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_HASH_COST: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file; `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub store_timeout: Duration,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<String>,
    /// Argon2 iteration count for password hashing.
    pub hash_cost: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            log_level: default_log_level().to_string(),
            log_dir: None,
            hash_cost: DEFAULT_HASH_COST,
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        config.db_path = value(ENV_DB_PATH)
            .or_else(|| value(ENV_DATABASE_URL).and_then(sqlite_path_from_url))
            .map(PathBuf::from);

        if let Some(raw) = value(ENV_STORE_TIMEOUT_MS) {
            let millis = parse_positive(ENV_STORE_TIMEOUT_MS, &raw)?;
            config.store_timeout = Duration::from_millis(millis);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(ENV_LOG_DIR);
        if let Some(raw) = value(ENV_HASH_COST) {
            let cost = parse_positive(ENV_HASH_COST, &raw)?;
            config.hash_cost = u32::try_from(cost).map_err(|_| {
                CoreError::validation(format!("{ENV_HASH_COST} is out of range: `{raw}`"))
            })?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> CoreResult<u64> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CoreError::validation(format!(
            "{key} must be a positive integer, got `{raw}`"
        ))),
    }
}

/// Accepts `sqlite://path` / `file:path` URLs and bare paths; other schemes are ignored.
fn sqlite_path_from_url(url: String) -> Option<String> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        return Some(path.to_string());
    }
    if let Some(path) = url.strip_prefix("file:") {
        return Some(path.to_string());
    }
    if url.contains("://") {
        return None;
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use crate::error::ErrorKind;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn reads_overrides_and_sqlite_database_url() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite:///tmp/market.db"),
            ("MARKETPLACE_STORE_TIMEOUT_MS", "250"),
            ("MARKETPLACE_HASH_COST", "3"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/market.db")));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.hash_cost, 3);
    }

    #[test]
    fn postgres_url_is_not_a_sqlite_path() {
        let config =
            CoreConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/market")])).unwrap();
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn malformed_timeout_is_a_validation_error() {
        let err = CoreConfig::from_lookup(lookup(&[("MARKETPLACE_STORE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
