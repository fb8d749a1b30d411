// src/lib.rs
// Public library surface for integration tests and the binaries.

pub mod api;
pub mod config;
pub mod format;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::PipelineConfig;
pub use crate::format::{FormatVariant, FormattedOutput, Formatter};
pub use crate::ingest::types::{CalendarSource, EconomicEvent, FetchError, Impact};
pub use crate::pipeline::{CalendarPipeline, PipelineError, PipelineReport};
