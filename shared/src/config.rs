use thiserror::Error;

use crate::api::{ApiConfig, ApiError};

pub const API_BASE_ENV: &str = "REPORTS_API";
pub const API_KEY_ENV: &str = "REPORTS_API_KEY";
pub const LOG_FILTER_ENV: &str = "REPORTS_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {0} is empty")]
    Empty(&'static str),

    #[error("invalid {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: ApiError,
    },
}

/// Boot-time settings, read once from the process environment.
#[derive(Debug)]
pub struct Config {
    pub api: ApiConfig,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an injectable lookup, so tests do
    /// not have to touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = required(&lookup, API_BASE_ENV)?;
        let key = required(&lookup, API_KEY_ENV)?;

        let api = ApiConfig::new(&base, key).map_err(|source| ConfigError::Invalid {
            name: API_BASE_ENV,
            source,
        })?;

        let log_filter = lookup(LOG_FILTER_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self { api, log_filter })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or(ConfigError::Missing(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE_ENV, "https://api.example.com/"),
            (API_KEY_ENV, "k"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url().as_str(), "https://api.example.com/");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_log_filter_override() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE_ENV, "https://api.example.com"),
            (API_KEY_ENV, "k"),
            (LOG_FILTER_ENV, "reports_core=debug"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "reports_core=debug");
    }

    #[test]
    fn test_missing_values() {
        assert_matches!(
            Config::from_lookup(lookup(&[(API_KEY_ENV, "k")])),
            Err(ConfigError::Missing(API_BASE_ENV))
        );
        assert_matches!(
            Config::from_lookup(lookup(&[(API_BASE_ENV, "https://a.example"), (API_KEY_ENV, " ")])),
            Err(ConfigError::Empty(API_KEY_ENV))
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert_matches!(
            Config::from_lookup(lookup(&[(API_BASE_ENV, "not a url"), (API_KEY_ENV, "k")])),
            Err(ConfigError::Invalid { name: API_BASE_ENV, .. })
        );
    }
}
