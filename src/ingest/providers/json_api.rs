// src/ingest/providers/json_api.rs
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use reqwest::header::ACCEPT;
use serde_json::{Map, Value};

use crate::ingest::types::{CalendarSource, EconomicEvent, FetchError, Impact, RecordSkipped};
use crate::ingest::{normalize_batch, normalize_clock};

const NAME: &str = "JsonApi";

/// Epoch values above this are taken as milliseconds.
const MILLIS_THRESHOLD: u64 = 100_000_000_000;

/// Digit strings up to this length are dates (`20250106`), never epochs.
const COMPACT_DATE_DIGITS: usize = 8;

/// Query scoping for the calendar endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonApiQuery {
    /// Comma-separated importance levels, passed through verbatim.
    pub importance: String,
    pub locale: String,
    pub days_ahead: u32,
    pub timeout: Duration,
}

impl Default for JsonApiQuery {
    fn default() -> Self {
        Self {
            importance: "2,3".to_string(),
            locale: "en".to_string(),
            days_ahead: 0,
            timeout: Duration::from_secs(30),
        }
    }
}

impl JsonApiQuery {
    /// `from`/`to` dates (local calendar) for the request.
    fn date_range(&self) -> Result<(String, String), FetchError> {
        let today = Local::now().date_naive();
        let until = today
            .checked_add_days(Days::new(u64::from(self.days_ahead)))
            .ok_or_else(|| FetchError::InvalidQuery {
                source_name: NAME,
                reason: format!("{} days ahead is outside the calendar range", self.days_ahead),
            })?;
        Ok((
            today.format("%Y-%m-%d").to_string(),
            until.format("%Y-%m-%d").to_string(),
        ))
    }
}

pub struct JsonApiProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        query: JsonApiQuery,
        client: reqwest::Client,
    },
}

impl JsonApiProvider {
    pub fn new(url: impl Into<String>, query: JsonApiQuery) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                query,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    /// Accepts `{"data": [...]}` or a bare array. Bad records are dropped, a bad body is an error.
    pub fn parse_payload(body: &str) -> Result<Vec<EconomicEvent>, FetchError> {
        let root: Value = serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload {
            source_name: NAME,
            reason: e.to_string(),
        })?;

        let records = match root {
            Value::Array(items) => items,
            Value::Object(mut envelope) => match envelope.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(FetchError::MissingStructure {
                        source_name: NAME,
                        what: "`data` array",
                    })
                }
            },
            _ => {
                return Err(FetchError::MissingStructure {
                    source_name: NAME,
                    what: "event list",
                })
            }
        };

        Ok(normalize_batch(NAME, records, |raw| parse_record(&raw)))
    }
}

#[async_trait]
impl CalendarSource for JsonApiProvider {
    async fn fetch(&self) -> Result<Vec<EconomicEvent>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_payload(s),
            Mode::Http { url, query, client } => {
                let (from, to) = query.date_range()?;
                let resp = client
                    .get(url)
                    .query(&[
                        ("from", from.as_str()),
                        ("to", to.as_str()),
                        ("importance", query.importance.as_str()),
                        ("lang", query.locale.as_str()),
                    ])
                    .header(ACCEPT, "application/json")
                    .timeout(query.timeout)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| FetchError::from_reqwest(NAME, e))?;

                let body = resp
                    .text()
                    .await
                    .map_err(|e| FetchError::from_reqwest(NAME, e))?;
                Self::parse_payload(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// Convert one raw record. Missing optional figures stay `None`.
pub fn parse_record(raw: &Value) -> Result<EconomicEvent, RecordSkipped> {
    let obj = raw.as_object().ok_or(RecordSkipped::NotAnObject)?;

    let title = first_of(obj, &["event", "title", "name"])
        .ok_or(RecordSkipped::MissingField("event"))
        .and_then(|v| scalar_text(v).ok_or(RecordSkipped::BadValue("event")))?;

    let currency = first_of(obj, &["currency", "country"])
        .ok_or(RecordSkipped::MissingField("currency"))
        .and_then(|v| scalar_text(v).ok_or(RecordSkipped::BadValue("currency")))?;

    let (time, date) = match first_of(obj, &["date"]).and_then(date_only) {
        // calendar day and clock come in separate fields
        Some(day) if first_of(obj, &["timestamp"]).is_none() => {
            let (clock, own_day) = first_of(obj, &["time"])
                .ok_or(RecordSkipped::MissingField("time"))
                .and_then(clock_and_date)?;
            (clock, own_day.or(Some(day)))
        }
        _ => first_of(obj, &["timestamp", "date", "time"])
            .ok_or(RecordSkipped::MissingField("time"))
            .and_then(clock_and_date)?,
    };

    let impact = first_of(obj, &["importance", "impact", "volatility"])
        .map(impact_from_value)
        .unwrap_or_default();

    let figure = |keys: &[&str]| first_of(obj, keys).and_then(scalar_text);

    Ok(EconomicEvent::new(time, currency, impact, title)?
        .with_date(date)
        .with_figures(
            figure(&["actual"]),
            figure(&["forecast", "consensus"]),
            figure(&["previous", "prior"]),
        ))
}

fn first_of<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

/// Strings (trimmed, non-empty) and numbers; everything else is absent.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn impact_from_value(v: &Value) -> Impact {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Impact::from_level)
            .unwrap_or_default(),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(level) => Impact::from_level(level),
            Err(_) => Impact::from_label(s),
        },
        _ => Impact::Low,
    }
}

/// `YYYY-MM-DD` or `YYYYMMDD` without a clock part.
fn date_only(v: &Value) -> Option<String> {
    let t = v.as_str()?.trim();
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            (t.len() == COMPACT_DATE_DIGITS)
                .then(|| NaiveDate::parse_from_str(t, "%Y%m%d").ok())
                .flatten()
        })
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Digit strings longer than a compact date, optionally signed.
fn epoch_from_str(t: &str) -> Option<i64> {
    let digits = t.strip_prefix('-').unwrap_or(t);
    if digits.len() <= COMPACT_DATE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse().ok()
}

fn epoch_to_local(epoch: i64) -> Option<(String, Option<String>)> {
    let secs = if epoch.unsigned_abs() > MILLIS_THRESHOLD {
        epoch / 1_000
    } else {
        epoch
    };
    let dt = Local.timestamp_opt(secs, 0).single()?;
    Some(local_parts(dt))
}

fn local_parts(dt: DateTime<Local>) -> (String, Option<String>) {
    (
        dt.format("%H:%M").to_string(),
        Some(dt.format("%Y-%m-%d").to_string()),
    )
}

/// Epoch numbers/strings and RFC 3339 become local `HH:MM` + date; clock strings pass through.
fn clock_and_date(v: &Value) -> Result<(String, Option<String>), RecordSkipped> {
    let bad = RecordSkipped::BadValue("time");
    match v {
        Value::Number(n) => n.as_i64().and_then(epoch_to_local).ok_or(bad),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Err(bad);
            }
            if let Some(epoch) = epoch_from_str(t) {
                return epoch_to_local(epoch).ok_or(bad);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
                return Ok(local_parts(dt.with_timezone(&Local)));
            }
            Ok((normalize_clock(t), None))
        }
        _ => Err(bad),
    }
}
