use crate::error::ConfigError;
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub request_timeout: Duration,
    /// Token from the environment; takes precedence over local storage.
    pub token: Option<String>,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = try_load(&lookup, "MINDLOG_BASE_URL", DEFAULT_BASE_URL, |raw| {
            Url::parse(raw)
                .map_err(|e| e.to_string())
                .and_then(|url| {
                    if url.cannot_be_a_base() {
                        Err("not a base URL".to_string())
                    } else {
                        Ok(url)
                    }
                })
        })?;

        let timeout_secs = try_load(
            &lookup,
            "MINDLOG_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
            |raw| match raw.parse::<u64>() {
                Ok(0) => Err("timeout must be positive".to_string()),
                Ok(secs) => Ok(secs),
                Err(e) => Err(e.to_string()),
            },
        )?;

        let data_dir = match lookup("MINDLOG_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".mindlog"))
                .ok_or(ConfigError::NoHomeDir)?,
        };

        Ok(Config {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            token: lookup("MINDLOG_TOKEN").filter(|t| !t.trim().is_empty()),
            data_dir,
            log_filter: lookup("MINDLOG_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("mindlog.log")
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse(raw.trim()).map_err(|reason| ConfigError::InvalidValue {
        key,
        value: raw.clone(),
        reason,
    })
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("MINDLOG_DATA_DIR", "/tmp/ml")])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.token, None);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/ml/local_storage.json"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("MINDLOG_BASE_URL", "https://api.mindlog.example/v1/"),
            ("MINDLOG_TIMEOUT_SECS", "12"),
            ("MINDLOG_TOKEN", "tok"),
            ("MINDLOG_DATA_DIR", "/data"),
            ("MINDLOG_LOG", "mindlog=debug"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.path(), "/v1/");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.log_filter, "mindlog=debug");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_url = Config::from_lookup(lookup(&[
            ("MINDLOG_BASE_URL", "not a url"),
            ("MINDLOG_DATA_DIR", "/data"),
        ]));
        assert!(matches!(
            bad_url,
            Err(ConfigError::InvalidValue { key: "MINDLOG_BASE_URL", .. })
        ));

        let zero = Config::from_lookup(lookup(&[
            ("MINDLOG_TIMEOUT_SECS", "0"),
            ("MINDLOG_DATA_DIR", "/data"),
        ]));
        assert!(matches!(
            zero,
            Err(ConfigError::InvalidValue { key: "MINDLOG_TIMEOUT_SECS", .. })
        ));
    }
}
