// src/format/digest.rs
use std::fmt::Write as _;

use super::NO_EVENTS_MESSAGE;
use crate::ingest::types::EconomicEvent;

/// `time | currency | glyph | title`, then `(A: .. | F: .. | P: ..)` when any figure exists.
pub fn render(events: &[EconomicEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let mut out = String::from("📅 Economic Calendar\n\n");
    for ev in events {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}",
            ev.time,
            ev.currency,
            ev.impact.glyph(),
            ev.event
        );
        if let Some(details) = figures_line(ev) {
            let _ = writeln!(out, "({details})");
        }
        out.push('\n');
    }
    out
}

fn figures_line(ev: &EconomicEvent) -> Option<String> {
    let parts: Vec<String> = [("A", &ev.actual), ("F", &ev.forecast), ("P", &ev.previous)]
        .into_iter()
        .filter_map(|(tag, v)| v.as_deref().map(|v| format!("{tag}: {v}")))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" | "))
}
