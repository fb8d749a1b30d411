// src/config/mod.rs
//! Pipeline configuration: defaults, then an optional TOML file, then env vars.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::format::FormatVariant;
use crate::ingest::providers::forex_factory::DEFAULT_FOREX_FACTORY_URL;

pub const ENV_CONFIG_PATH: &str = "CALENDAR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/calendar.toml";

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Which upstream calendar to read.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(try_from = "String")]
pub enum SourceKind {
    #[default]
    Mock,
    ForexFactory,
    JsonApi,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(SourceKind::Mock),
            "forex_factory" | "forexfactory" | "scrape" => Ok(SourceKind::ForexFactory),
            "json_api" | "json" | "api" => Ok(SourceKind::JsonApi),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

impl TryFrom<String> for SourceKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceKind,
    pub format: FormatVariant,
    /// Base URL of the notification service. `None` disables forwarding.
    pub sink_url: Option<String>,
    pub forward_timeout_secs: u64,
    pub forex_factory_url: String,
    pub json_api_url: Option<String>,
    pub json_api_importance: String,
    pub json_api_locale: String,
    pub json_api_days_ahead: u32,
    pub json_api_timeout_secs: u64,
    /// Target of the "full calendar" button on alerts.
    pub calendar_link: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Mock,
            format: FormatVariant::Digest,
            sink_url: None,
            forward_timeout_secs: 30,
            forex_factory_url: DEFAULT_FOREX_FACTORY_URL.to_string(),
            json_api_url: None,
            json_api_importance: "2,3".to_string(),
            json_api_locale: "en".to_string(),
            json_api_days_ahead: 0,
            json_api_timeout_secs: 30,
            calendar_link: DEFAULT_FOREX_FACTORY_URL.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration for the running process:
    /// 1) $CALENDAR_CONFIG_PATH (must exist when set)
    /// 2) config/calendar.toml when present
    /// 3) built-in defaults
    ///
    /// Environment variables are applied on top.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => Self::load_from_file(Path::new(&p))?,
            Err(_) => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.exists() {
                    Self::load_from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Overlay values from a key lookup (env in production). Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = value("CALENDAR_SOURCE") {
            self.source = v.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "source",
                reason,
            })?;
        }
        if let Some(v) = value("CALENDAR_FORMAT") {
            self.format = v.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "format",
                reason,
            })?;
        }
        if let Some(v) = value("TELEGRAM_SERVICE_URL") {
            self.sink_url = Some(v);
        }
        if let Some(v) = value("FORWARD_TIMEOUT_SECS") {
            self.forward_timeout_secs = parse_number("forward_timeout_secs", &v)?;
        }
        if let Some(v) = value("FOREX_FACTORY_URL") {
            self.forex_factory_url = v;
        }
        if let Some(v) = value("CALENDAR_API_URL") {
            self.json_api_url = Some(v);
        }
        if let Some(v) = value("CALENDAR_API_IMPORTANCE") {
            self.json_api_importance = v;
        }
        if let Some(v) = value("CALENDAR_API_LOCALE") {
            self.json_api_locale = v;
        }
        if let Some(v) = value("CALENDAR_API_DAYS_AHEAD") {
            self.json_api_days_ahead = parse_number("json_api_days_ahead", &v)?;
        }
        if let Some(v) = value("CALENDAR_API_TIMEOUT_SECS") {
            self.json_api_timeout_secs = parse_number("json_api_timeout_secs", &v)?;
        }
        if let Some(v) = value("CALENDAR_LINK") {
            self.calendar_link = v;
        }

        // A blank sink in the file means "not configured".
        if self.sink_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.sink_url = None;
        }
        Ok(())
    }
}

fn parse_number<T>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
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
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_mock_digest_without_sink() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.source, SourceKind::Mock);
        assert_eq!(cfg.format, FormatVariant::Digest);
        assert_eq!(cfg.sink_url, None);
        assert_eq!(cfg.json_api_timeout_secs, 30);
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
            source = "json_api"
            format = "signal"
            json_api_url = "https://calendar.example/api/events"
            json_api_days_ahead = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.source, SourceKind::JsonApi);
        assert_eq!(cfg.format, FormatVariant::Signal);
        assert_eq!(cfg.json_api_days_ahead, 3);
        assert_eq!(cfg.json_api_locale, "en");
    }

    #[test]
    fn file_and_env_accept_the_same_names() {
        let from_file = PipelineConfig::from_toml_str(
            r#"
            source = "scrape"
            format = "Trading"
            "#,
        )
        .unwrap();

        let mut from_env = PipelineConfig::default();
        from_env
            .apply_overrides(lookup(&[("CALENDAR_SOURCE", "scrape"), ("CALENDAR_FORMAT", "Trading")]))
            .unwrap();

        assert_eq!(from_file.source, SourceKind::ForexFactory);
        assert_eq!(from_file.format, FormatVariant::Signal);
        assert_eq!(from_file.source, from_env.source);
        assert_eq!(from_file.format, from_env.format);

        let cfg = PipelineConfig::from_toml_str(r#"format = "plain""#).unwrap();
        assert_eq!(cfg.format, FormatVariant::Digest);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = PipelineConfig::from_toml_str(r#"source = "telepathy""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_and_blank_values_are_ignored() {
        let mut cfg = PipelineConfig::default();
        cfg.apply_overrides(lookup(&[
            ("CALENDAR_SOURCE", "scrape"),
            ("CALENDAR_FORMAT", "Alert"),
            ("TELEGRAM_SERVICE_URL", "http://sink.local"),
            ("CALENDAR_API_LOCALE", "   "),
            ("CALENDAR_API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.source, SourceKind::ForexFactory);
        assert_eq!(cfg.format, FormatVariant::Alert);
        assert_eq!(cfg.sink_url.as_deref(), Some("http://sink.local"));
        assert_eq!(cfg.json_api_locale, "en");
        assert_eq!(cfg.json_api_timeout_secs, 5);
    }

    #[test]
    fn invalid_override_values_are_reported() {
        let mut cfg = PipelineConfig::default();
        let err = cfg
            .apply_overrides(lookup(&[("FORWARD_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "forward_timeout_secs",
                ..
            }
        ));

        let err = cfg
            .apply_overrides(lookup(&[("CALENDAR_SOURCE", "carrier-pigeon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "source", .. }));
    }

    #[test]
    fn blank_sink_in_file_means_disabled() {
        let mut cfg = PipelineConfig::from_toml_str(r#"sink_url = """#).unwrap();
        cfg.apply_overrides(|_| None).unwrap();
        assert_eq!(cfg.sink_url, None);
    }
}
