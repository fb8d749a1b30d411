// src/format/alert.rs
use std::fmt::Write as _;

use serde::Serialize;

use super::{NO_EVENTS_MESSAGE, POSITION_SIZE_NOTE, RISK_NOTES};
use crate::ingest::types::EconomicEvent;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━";
const CLOSING_LINE: &str = "💡 Trade the reaction, not the prediction.";

/// Message body plus the presentation hints the notification channel understands.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AlertMessage {
    pub message: String,
    pub parse_mode: String,
    pub disable_web_page_preview: bool,
    pub buttons: Vec<AlertButton>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AlertButton {
    pub text: String,
    pub url: String,
}

pub fn render(events: &[EconomicEvent], calendar_link: &str) -> AlertMessage {
    AlertMessage {
        message: body(events),
        parse_mode: "Markdown".to_string(),
        disable_web_page_preview: true,
        buttons: vec![AlertButton {
            text: "📅 Full Calendar".to_string(),
            url: calendar_link.to_string(),
        }],
    }
}

fn body(events: &[EconomicEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let mut out = String::from("🚨 *Economic Calendar Alert*\n\n");
    for ev in events {
        let _ = writeln!(out, "⏰ Time: {}", ev.time);
        let _ = writeln!(out, "💱 Currency: {}", ev.currency);
        let _ = writeln!(
            out,
            "{} Impact: {}",
            ev.impact.glyph(),
            ev.impact.as_str().to_uppercase()
        );
        let _ = writeln!(out, "📰 Event: {}", ev.event);
        if let Some(v) = &ev.forecast {
            let _ = writeln!(out, "📊 Forecast: {v}");
        }
        if let Some(v) = &ev.previous {
            let _ = writeln!(out, "📈 Previous: {v}");
        }
        if let Some(v) = &ev.actual {
            let _ = writeln!(out, "✅ Actual: {v}");
        }
        let _ = writeln!(out, "{DIVIDER}");
    }

    out.push_str("\n⚠️ *Risk Management*\n");
    let _ = writeln!(out, "• {POSITION_SIZE_NOTE}");
    for note in RISK_NOTES {
        let _ = writeln!(out, "• {note}");
    }
    out.push('\n');
    out.push_str(CLOSING_LINE);
    out
}
