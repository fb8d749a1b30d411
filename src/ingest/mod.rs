// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{CalendarSource, EconomicEvent, FetchError, RecordSkipped};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "calendar_events_total",
            "Events normalized from calendar sources."
        );
        describe_counter!(
            "calendar_records_skipped_total",
            "Upstream records dropped as malformed."
        );
        describe_counter!(
            "calendar_fetch_errors_total",
            "Calendar source fetch/parse failures."
        );
        describe_counter!(
            "calendar_forward_errors_total",
            "Failed deliveries to the notification service."
        );
        describe_counter!("calendar_runs_total", "Pipeline runs started.");
        describe_histogram!("calendar_parse_ms", "Source parse time in milliseconds.");
    });
}

/// Normalize scraped cell text: strip tags, decode entities, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("static regex"));
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));

    // Tags go first so an encoded `&lt;` in the text survives as a literal `<`.
    let stripped = re_tags.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped).replace('\u{00A0}', " ");
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Bring clock strings to zero-padded 24-hour `HH:MM`.
///
/// Accepts `8:30am`, `2:05 PM`, `9:00`, `14:30:00`. Anything else
/// (`All Day`, `Tentative`, `Day 2`) is returned trimmed and otherwise untouched.
pub fn normalize_clock(raw: &str) -> String {
    static RE_CLOCK: OnceCell<Regex> = OnceCell::new();
    let re = RE_CLOCK.get_or_init(|| {
        Regex::new(r"(?i)^(\d{1,2}):(\d{2})(?::\d{2})?\s*([ap]\.?m\.?)?$").expect("static regex")
    });

    let trimmed = raw.trim();
    let Some(caps) = re.captures(trimmed) else {
        return trimmed.to_string();
    };
    let (Ok(mut hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return trimmed.to_string();
    };
    if let Some(meridiem) = caps.get(3) {
        if hour == 0 || hour > 12 {
            return trimmed.to_string();
        }
        let pm = meridiem.as_str().to_ascii_lowercase().starts_with('p');
        hour = (hour % 12) + if pm { 12 } else { 0 };
    }
    if hour > 23 || minute > 59 {
        return trimmed.to_string();
    }
    format!("{hour:02}:{minute:02}")
}

/// Stable ascending sort on the `time` string.
pub fn sort_events(events: &mut [EconomicEvent]) {
    events.sort_by(|a, b| a.time.cmp(&b.time));
}

/// Apply `parse` to every raw record, keeping the good ones.
///
/// A record that fails to parse is logged and counted, and the batch moves on.
pub fn normalize_batch<R, F>(source: &'static str, records: R, mut parse: F) -> Vec<EconomicEvent>
where
    R: IntoIterator,
    F: FnMut(R::Item) -> Result<EconomicEvent, RecordSkipped>,
{
    let mut out = Vec::new();
    let mut skipped = 0u64;
    for (index, raw) in records.into_iter().enumerate() {
        match parse(raw) {
            Ok(ev) => out.push(ev),
            Err(reason) => {
                skipped += 1;
                tracing::warn!(source, index, %reason, "skipping calendar record");
            }
        }
    }
    if skipped > 0 {
        counter!("calendar_records_skipped_total").increment(skipped);
    }
    counter!("calendar_events_total").increment(out.len() as u64);
    out
}

/// Fetch from `source` and return its events in ascending time order.
pub async fn fetch_sorted(source: &dyn CalendarSource) -> Result<Vec<EconomicEvent>, FetchError> {
    ensure_metrics_described();

    let t0 = std::time::Instant::now();
    let mut events = match source.fetch().await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, source = source.name(), "calendar fetch failed");
            counter!("calendar_fetch_errors_total").increment(1);
            return Err(e);
        }
    };
    histogram!("calendar_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    sort_events(&mut events);
    tracing::debug!(source = source.name(), count = events.len(), "calendar fetched");
    Ok(events)
}
