//! Runtime configuration read from the environment (after `.env` is loaded).

use anyhow::{Context, Result};
use std::time::Duration;

use crate::classify::BreakpointTables;

pub const DEFAULT_BASE_URL: &str = "https://xp-backend.sytes.net/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and calibration settings for the portal client.
///
/// | Variable               | Default                      |
/// |------------------------|------------------------------|
/// | `AQ_API_BASE_URL`      | [`DEFAULT_BASE_URL`]         |
/// | `AQ_API_KEY`           | unset (no auth header)       |
/// | `AQ_API_KEY_HEADER`    | `Authorization` as bearer    |
/// | `AQ_HTTP_TIMEOUT_SECS` | [`DEFAULT_TIMEOUT_SECS`]     |
/// | `AQ_BREAKPOINTS_FILE`  | unset (EPA tables)           |
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: Option<String>,
    pub timeout: Duration,
    pub breakpoints_file: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            breakpoints_file: None,
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout = match get("AQ_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("AQ_HTTP_TIMEOUT_SECS must be seconds, got '{raw}'"))?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            base_url: get("AQ_API_BASE_URL").unwrap_or(defaults.base_url),
            api_key: get("AQ_API_KEY"),
            api_key_header: get("AQ_API_KEY_HEADER"),
            timeout,
            breakpoints_file: get("AQ_BREAKPOINTS_FILE"),
        })
    }

    /// EPA tables unless a breakpoint file is configured.
    pub fn breakpoint_tables(&self) -> Result<BreakpointTables> {
        match &self.breakpoints_file {
            Some(path) => BreakpointTables::load(path),
            None => Ok(BreakpointTables::epa()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert_eq!(config.breakpoint_tables().unwrap(), BreakpointTables::epa());
    }

    #[test]
    fn test_overrides() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("AQ_API_BASE_URL", "http://localhost:8080/api/v1"),
            ("AQ_API_KEY", "k"),
            ("AQ_API_KEY_HEADER", "X-Api-Key"),
            ("AQ_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.api_key_header.as_deref(), Some("X-Api-Key"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = PortalConfig::from_lookup(lookup(&[("AQ_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_bad_timeout() {
        assert!(PortalConfig::from_lookup(lookup(&[("AQ_HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_missing_breakpoint_file() {
        let config = PortalConfig {
            breakpoints_file: Some("/nonexistent/breakpoints.json".to_string()),
            ..Default::default()
        };
        assert!(config.breakpoint_tables().is_err());
    }
}
