// src/ingest/providers/forex_factory.rs
//! Scrape adapter for the ForexFactory weekly calendar page.
//!
//! The page is a single `<table class="calendar__table">` whose rows carry
//! one release each. Date and time cells are only filled on the first row of
//! a group, so both are carried forward while walking the rows top-down.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

use crate::ingest::types::{CalendarSource, EconomicEvent, FetchError, Impact, RecordSkipped};
use crate::ingest::{clean_text, normalize_batch, normalize_clock};

pub const DEFAULT_FOREX_FACTORY_URL: &str = "https://www.forexfactory.com/calendar";

const NAME: &str = "ForexFactory";

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct ForexFactoryProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String },
}

impl ForexFactoryProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http { url: url.into() },
        }
    }

    /// Parse a calendar page into events (unsorted, page order).
    pub fn parse_calendar(html: &str) -> Result<Vec<EconomicEvent>, FetchError> {
        static RE_TABLE: OnceCell<Regex> = OnceCell::new();
        static RE_ROW: OnceCell<Regex> = OnceCell::new();
        let re_table = RE_TABLE.get_or_init(|| {
            Regex::new(
                r#"(?is)<table\b[^>]*\bclass\s*=\s*["'][^"']*\bcalendar__table\b[^"']*["'][^>]*>(.*?)</table>"#,
            )
            .expect("static regex")
        });
        let re_row = RE_ROW.get_or_init(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr>").expect("static regex"));

        let table = re_table
            .captures(html)
            .and_then(|c| c.get(1))
            .ok_or(FetchError::MissingStructure {
                source_name: NAME,
                what: "calendar table",
            })?
            .as_str();

        let rows: Vec<RowCells> = re_row
            .captures_iter(table)
            .filter(|c| {
                let classes = class_attr(&c[1]);
                has_class(&classes, "calendar__row") || has_class(&classes, "calendar_row")
            })
            .map(|c| RowCells::from_inner(&c[2]))
            .filter(RowCells::is_relevant)
            .collect();

        let mut current_date: Option<String> = None;
        let mut last_time = String::new();
        Ok(normalize_batch(NAME, rows, |row| {
            row.into_event(&mut current_date, &mut last_time)
        }))
    }

    async fn download(url: &str) -> Result<String, FetchError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Transport {
                source_name: NAME,
                reason: e.to_string(),
            })?;

        // First hit only establishes the session cookies.
        client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(NAME, e))?;

        let resp = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(NAME, e))?;

        resp.text()
            .await
            .map_err(|e| FetchError::from_reqwest(NAME, e))
    }
}

#[async_trait]
impl CalendarSource for ForexFactoryProvider {
    async fn fetch(&self) -> Result<Vec<EconomicEvent>, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_calendar(s),
            Mode::Http { url } => {
                let body = Self::download(url).await?;
                Self::parse_calendar(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    h.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    for (name, value) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        h.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    h
}

fn class_attr(attrs: &str) -> String {
    static RE_CLASS: OnceCell<Regex> = OnceCell::new();
    let re = RE_CLASS.get_or_init(|| {
        Regex::new(r#"(?is)\bclass\s*=\s*["']([^"']*)["']"#).expect("static regex")
    });
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn has_class(classes: &str, wanted: &str) -> bool {
    classes.split_whitespace().any(|c| c == wanted)
}

/// Impact indicator span: `icon--ff-impact-red` style or literal `high`/`medium`.
fn impact_from_cell(inner: &str) -> Impact {
    static RE_SPAN: OnceCell<Regex> = OnceCell::new();
    let re = RE_SPAN.get_or_init(|| Regex::new(r"(?is)<span\b([^>]*)>").expect("static regex"));

    let Some(span) = re.captures(inner) else {
        return Impact::Low;
    };
    let classes = class_attr(&span[1]).to_ascii_lowercase();
    if classes.contains("high") || classes.contains("-red") {
        Impact::High
    } else if classes.contains("medium") || classes.contains("-ora") {
        Impact::Medium
    } else {
        Impact::Low
    }
}

#[derive(Debug, Default)]
struct RowCells {
    date: Option<String>,
    time: Option<String>,
    currency: Option<String>,
    impact: Option<String>,
    event: Option<String>,
    actual: Option<String>,
    forecast: Option<String>,
    previous: Option<String>,
}

impl RowCells {
    fn from_inner(row_html: &str) -> Self {
        static RE_CELL: OnceCell<Regex> = OnceCell::new();
        let re = RE_CELL.get_or_init(|| Regex::new(r"(?is)<td\b([^>]*)>(.*?)</td>").expect("static regex"));

        let mut cells = RowCells::default();
        for c in re.captures_iter(row_html) {
            let classes = class_attr(&c[1]);
            let inner = c[2].to_string();
            let slot = if has_class(&classes, "calendar__date") {
                &mut cells.date
            } else if has_class(&classes, "calendar__time") {
                &mut cells.time
            } else if has_class(&classes, "calendar__currency") {
                &mut cells.currency
            } else if has_class(&classes, "calendar__impact") {
                &mut cells.impact
            } else if has_class(&classes, "calendar__event") {
                &mut cells.event
            } else if has_class(&classes, "calendar__actual") {
                &mut cells.actual
            } else if has_class(&classes, "calendar__forecast") {
                &mut cells.forecast
            } else if has_class(&classes, "calendar__previous") {
                &mut cells.previous
            } else {
                continue;
            };
            slot.get_or_insert(inner);
        }
        cells
    }

    /// Day breakers and spacer rows carry none of the release cells.
    fn is_relevant(&self) -> bool {
        self.date.is_some()
            || self.time.is_some()
            || self.currency.is_some()
            || self.impact.is_some()
            || self.event.is_some()
    }

    fn into_event(
        self,
        current_date: &mut Option<String>,
        last_time: &mut String,
    ) -> Result<EconomicEvent, RecordSkipped> {
        if let Some(d) = self.date.as_deref().map(clean_text) {
            if !d.is_empty() {
                *current_date = Some(d);
            }
        }

        let time = self.time.ok_or(RecordSkipped::MissingField("time"))?;
        let currency = self.currency.ok_or(RecordSkipped::MissingField("currency"))?;
        let impact = self.impact.ok_or(RecordSkipped::MissingField("impact"))?;
        let title = self.event.ok_or(RecordSkipped::MissingField("event"))?;

        let time = clean_text(&time);
        if !time.is_empty() {
            *last_time = normalize_clock(&time);
        }
        // nothing above to inherit from
        if last_time.is_empty() {
            return Err(RecordSkipped::MissingField("time"));
        }

        let text = |v: Option<String>| v.as_deref().map(clean_text);
        Ok(
            EconomicEvent::new(last_time.clone(), clean_text(&currency), impact_from_cell(&impact), clean_text(&title))?
                .with_date(current_date.clone())
                .with_figures(text(self.actual), text(self.forecast), text(self.previous)),
        )
    }
}
