// src/notify/mod.rs
pub mod http;

use thiserror::Error;

use crate::format::FormattedOutput;

pub use self::http::HttpForwarder;

/// Sub-path on the notification service for each kind of output.
pub fn route(output: &FormattedOutput) -> &'static str {
    match output {
        FormattedOutput::Text(_) => "/send_calendar",
        FormattedOutput::Alert(_) => "/send_alert",
        FormattedOutput::Signal(_) => "/send_signal",
    }
}

/// What happened to a rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No destination configured.
    Skipped,
    Delivered { path: &'static str, status: u16 },
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("notification service unreachable at {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("notification service at {url} answered HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Delivers rendered calendars downstream.
#[async_trait::async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, output: &FormattedOutput) -> Result<Delivery, ForwardError>;
}
