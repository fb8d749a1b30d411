// src/pipeline.rs
//! fetch → normalize → sort → format → forward, once per call.
//!
//! Nothing is kept between runs; concurrent runs share no state beyond the
//! read-only pipeline wiring.

use metrics::counter;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig};
use crate::format::{FormattedOutput, Formatter};
use crate::ingest::providers::build_source;
use crate::ingest::types::{CalendarSource, FetchError};
use crate::ingest::{ensure_metrics_described, fetch_sorted};
use crate::notify::{Delivery, ForwardError, Forwarder, HttpForwarder};

/// Step of a run. Error bodies name it in lowercase (`fetch`, `forward`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Format,
    Forward,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Delivery failed after rendering; the rendered output is kept for the caller.
    #[error("forward failed: {source}")]
    Forward {
        #[source]
        source: ForwardError,
        output: FormattedOutput,
    },
}

impl PipelineError {
    /// Stage in which the run stopped.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) => Stage::Fetch,
            PipelineError::Forward { .. } => Stage::Forward,
        }
    }

    pub fn output(&self) -> Option<&FormattedOutput> {
        match self {
            PipelineError::Fetch(_) => None,
            PipelineError::Forward { output, .. } => Some(output),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub event_count: usize,
    pub output: FormattedOutput,
    pub delivery: Delivery,
}

pub struct CalendarPipeline {
    source: Box<dyn CalendarSource>,
    formatter: Formatter,
    forwarder: Box<dyn Forwarder>,
}

impl CalendarPipeline {
    pub fn new(
        source: Box<dyn CalendarSource>,
        formatter: Formatter,
        forwarder: Box<dyn Forwarder>,
    ) -> Self {
        Self {
            source,
            formatter,
            forwarder,
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Result<Self, ConfigError> {
        let source = build_source(cfg)?;
        let formatter = Formatter::new(cfg.format, cfg.calendar_link.clone());
        let forwarder =
            HttpForwarder::new(cfg.sink_url.clone()).with_timeout(cfg.forward_timeout_secs);
        Ok(Self::new(source, formatter, Box::new(forwarder)))
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        ensure_metrics_described();
        counter!("calendar_runs_total").increment(1);
        let source = self.source.name();

        tracing::debug!(stage = ?Stage::Fetch, source, "pipeline stage");
        let events = fetch_sorted(self.source.as_ref()).await?;

        tracing::debug!(stage = ?Stage::Format, events = events.len(), "pipeline stage");
        let output = self.formatter.format(&events);

        tracing::debug!(stage = ?Stage::Forward, "pipeline stage");
        let delivery = match self.forwarder.forward(&output).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, source, "calendar forward failed");
                counter!("calendar_forward_errors_total").increment(1);
                return Err(PipelineError::Forward { source: e, output });
            }
        };

        tracing::info!(
            source,
            events = events.len(),
            delivered = matches!(delivery, Delivery::Delivered { .. }),
            "calendar pipeline finished"
        );
        Ok(PipelineReport {
            event_count: events.len(),
            output,
            delivery,
        })
    }
}
