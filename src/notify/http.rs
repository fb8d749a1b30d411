// src/notify/http.rs
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use super::{route, Delivery, ForwardError, Forwarder};
use crate::format::FormattedOutput;

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

/// POSTs rendered output to `{base_url}{route}`. Without a base URL it does nothing.
#[derive(Clone)]
pub struct HttpForwarder {
    base_url: Option<String>,
    client: Client,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }
}

#[async_trait::async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, output: &FormattedOutput) -> Result<Delivery, ForwardError> {
        let Some(base) = &self.base_url else {
            tracing::debug!("forwarding disabled (no TELEGRAM_SERVICE_URL)");
            return Ok(Delivery::Skipped);
        };

        let path = route(output);
        let url = format!("{base}{path}");
        let req = self.client.post(&url).timeout(self.timeout);
        let req = match output {
            FormattedOutput::Text(message) => req.json(&MessageBody { message }),
            FormattedOutput::Alert(alert) => req.json(alert),
            FormattedOutput::Signal(signal) => req.json(signal),
        };

        let rsp = req.send().await.map_err(|e| ForwardError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(ForwardError::Status {
                url,
                status: status.as_u16(),
            });
        }

        tracing::info!(%url, status = status.as_u16(), "calendar forwarded");
        Ok(Delivery::Delivered {
            path,
            status: status.as_u16(),
        })
    }
}
