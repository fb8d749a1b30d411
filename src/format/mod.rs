// src/format/mod.rs
//! Presentation variants over an ordered event list. Everything here is pure.

pub mod alert;
pub mod digest;
pub mod signal;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ingest::types::EconomicEvent;

pub use alert::{AlertButton, AlertMessage};
pub use signal::{select_primary, RiskNote, SignalPayload};

/// Placeholder every variant renders for an empty calendar.
pub const NO_EVENTS_MESSAGE: &str = "No economic events scheduled for today.";

pub(crate) const POSITION_SIZE_NOTE: &str = "Reduce position size to 50% of normal ahead of high-impact releases";

pub(crate) const RISK_NOTES: [&str; 3] = [
    "Expect widened spreads and slippage around the release",
    "Avoid opening new positions in the minutes before the announcement",
    "Wait for the first reaction candle to close before entering",
];

/// Config files and env share the `FromStr` vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FormatVariant {
    /// One line per event plus an optional figures line.
    #[default]
    Digest,
    /// Verbose blocks, risk notes and link buttons.
    Alert,
    /// Structured payload for the trading-signal channel.
    Signal,
}

impl FromStr for FormatVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" | "plain" => Ok(FormatVariant::Digest),
            "alert" | "rich" => Ok(FormatVariant::Alert),
            "signal" | "trading" => Ok(FormatVariant::Signal),
            other => Err(format!("unknown format '{other}'")),
        }
    }
}

impl TryFrom<String> for FormatVariant {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Rendered result of one pipeline run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FormattedOutput {
    Text(String),
    Alert(AlertMessage),
    Signal(SignalPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pub variant: FormatVariant,
    /// Target of the alert's "full calendar" button.
    pub calendar_link: String,
}

impl Formatter {
    pub fn new(variant: FormatVariant, calendar_link: impl Into<String>) -> Self {
        Self {
            variant,
            calendar_link: calendar_link.into(),
        }
    }

    pub fn format(&self, events: &[EconomicEvent]) -> FormattedOutput {
        match self.variant {
            FormatVariant::Digest => FormattedOutput::Text(digest::render(events)),
            FormatVariant::Alert => FormattedOutput::Alert(alert::render(events, &self.calendar_link)),
            FormatVariant::Signal => match signal::build(events) {
                Some(payload) => FormattedOutput::Signal(payload),
                None => FormattedOutput::Text(NO_EVENTS_MESSAGE.to_string()),
            },
        }
    }
}
