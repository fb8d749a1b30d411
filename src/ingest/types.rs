// src/ingest/types.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected market significance of a release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    #[default]
    Low,
    Medium,
    High,
}

impl Impact {
    /// Map a source's severity label onto the three levels. Anything unrecognised is `Low`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "h" | "3" | "red" | "bull3" => Impact::High,
            "medium" | "med" | "moderate" | "2" | "orange" | "ora" | "bull2" => Impact::Medium,
            _ => Impact::Low,
        }
    }

    /// Numeric importance scales (1..=3).
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=1 => Impact::Low,
            2 => Impact::Medium,
            _ => Impact::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Impact::High => "🔴",
            Impact::Medium => "🟡",
            Impact::Low => "⚪",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar entry, independent of the source it came from.
///
/// Construct through [`EconomicEvent::new`], which refuses an empty title.
/// `actual`/`forecast`/`previous` are `None` when not (yet) published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EconomicEvent {
    pub time: String,
    pub currency: String,
    pub impact: Impact,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub actual: Option<String>,
    pub forecast: Option<String>,
    pub previous: Option<String>,
}

impl EconomicEvent {
    pub fn new(
        time: impl Into<String>,
        currency: impl Into<String>,
        impact: Impact,
        event: impl Into<String>,
    ) -> Result<Self, RecordSkipped> {
        let event = event.into();
        if event.trim().is_empty() {
            return Err(RecordSkipped::EmptyTitle);
        }
        Ok(Self {
            time: time.into(),
            currency: currency.into(),
            impact,
            event,
            date: None,
            actual: None,
            forecast: None,
            previous: None,
        })
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_figures(
        mut self,
        actual: Option<String>,
        forecast: Option<String>,
        previous: Option<String>,
    ) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        self.actual = keep(actual);
        self.forecast = keep(forecast);
        self.previous = keep(previous);
        self
    }

    pub fn has_figures(&self) -> bool {
        self.actual.is_some() || self.forecast.is_some() || self.previous.is_some()
    }
}

/// Batch-level failure of a source. Terminal for the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{source_name} request failed: {reason}")]
    Transport {
        source_name: &'static str,
        reason: String,
    },

    #[error("{source_name} returned HTTP {status}")]
    Status { source_name: &'static str, status: u16 },

    #[error("{source_name} payload could not be parsed: {reason}")]
    MalformedPayload {
        source_name: &'static str,
        reason: String,
    },

    #[error("{source_name} payload is missing {what}")]
    MissingStructure {
        source_name: &'static str,
        what: &'static str,
    },

    #[error("{source_name} request could not be built: {reason}")]
    InvalidQuery {
        source_name: &'static str,
        reason: String,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(source_name: &'static str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                source_name,
                status: status.as_u16(),
            },
            None => FetchError::Transport {
                source_name,
                reason: err.to_string(),
            },
        }
    }
}

/// Why a single upstream record was dropped. Logged, never returned to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordSkipped {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unusable value for `{0}`")]
    BadValue(&'static str),
    #[error("empty event title")]
    EmptyTitle,
}

/// One upstream calendar origin.
#[async_trait::async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<EconomicEvent>, FetchError>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_fall_back_to_low() {
        assert_eq!(Impact::from_label("HIGH"), Impact::High);
        assert_eq!(Impact::from_label(" moderate "), Impact::Medium);
        assert_eq!(Impact::from_label("holiday"), Impact::Low);
        assert_eq!(Impact::from_label(""), Impact::Low);
    }

    #[test]
    fn numeric_levels_clamp() {
        assert_eq!(Impact::from_level(-4), Impact::Low);
        assert_eq!(Impact::from_level(1), Impact::Low);
        assert_eq!(Impact::from_level(2), Impact::Medium);
        assert_eq!(Impact::from_level(3), Impact::High);
        assert_eq!(Impact::from_level(9), Impact::High);
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = EconomicEvent::new("10:00", "USD", Impact::High, "   ").unwrap_err();
        assert_eq!(err, RecordSkipped::EmptyTitle);
    }

    #[test]
    fn blank_figures_become_absent() {
        let ev = EconomicEvent::new("10:00", "USD", Impact::Low, "CPI")
            .unwrap()
            .with_figures(Some("".into()), Some("0.3%".into()), Some("0".into()));
        assert_eq!(ev.actual, None);
        assert_eq!(ev.forecast.as_deref(), Some("0.3%"));
        // zero is a value, not an absence
        assert_eq!(ev.previous.as_deref(), Some("0"));
    }

    #[test]
    fn impact_serializes_lowercase() {
        let v = serde_json::to_value(Impact::Medium).unwrap();
        assert_eq!(v, serde_json::json!("medium"));
    }
}
