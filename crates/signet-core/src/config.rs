//! Query configuration
//!
//! Loaded from TOML, then optionally overridden from the environment:
//!
//! ```toml
//! default_limit = 50
//! max_limit = 500
//! timeout_ms = 2000
//! ```

use serde::Deserialize;
use std::time::Duration;

use crate::errors::{Result, SignetError};

pub const ENV_DEFAULT_LIMIT: &str = "SIGNET_DEFAULT_LIMIT";
pub const ENV_MAX_LIMIT: &str = "SIGNET_MAX_LIMIT";
pub const ENV_TIMEOUT_MS: &str = "SIGNET_TIMEOUT_MS";

/// Page size bounds and the per-query time budget
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size when the caller does not set one
    pub default_limit: usize,
    /// Largest page size a caller may request
    pub max_limit: usize,
    /// Budget for fetch + hydrate + reconcile, in milliseconds
    pub timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
            timeout_ms: 5000,
        }
    }
}

impl QueryConfig {
    /// # Errors
    ///
    /// `Config` if the TOML is malformed or the bounds are inconsistent.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: QueryConfig = toml::from_str(input).map_err(|e| SignetError::Config {
            message: e.to_string(),
        })?;
        config.validate()
    }

    /// Apply `SIGNET_*` environment overrides
    ///
    /// # Errors
    ///
    /// `Config` if a variable is not a number or the result is inconsistent.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by `with_env_overrides`)
    ///
    /// # Errors
    ///
    /// `Config` if a value is not a number or the result is inconsistent.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup(ENV_DEFAULT_LIMIT) {
            self.default_limit = parse_var(ENV_DEFAULT_LIMIT, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_LIMIT) {
            self.max_limit = parse_var(ENV_MAX_LIMIT, &v)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_var(ENV_TIMEOUT_MS, &v)?;
        }
        self.validate()
    }

    /// # Errors
    ///
    /// `Config` unless `0 < default_limit <= max_limit` and `timeout_ms > 0`.
    pub fn validate(self) -> Result<Self> {
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(SignetError::Config {
                message: format!(
                    "default_limit {} must be between 1 and max_limit {}",
                    self.default_limit, self.max_limit
                ),
            });
        }
        if self.timeout_ms == 0 {
            return Err(SignetError::Config {
                message: "timeout_ms must be positive".to_string(),
            });
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolve a caller-supplied page size against the configured bounds
    ///
    /// # Errors
    ///
    /// `InvalidLimit` for zero or anything above `max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize> {
        let limit = requested.unwrap_or(self.default_limit);
        if limit == 0 || limit > self.max_limit {
            return Err(SignetError::InvalidLimit {
                limit,
                max: self.max_limit,
            });
        }
        Ok(limit)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| SignetError::Config {
        message: format!("{} must be a non-negative integer, got {:?}", key, value),
    })
}
