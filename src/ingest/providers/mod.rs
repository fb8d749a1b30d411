// src/ingest/providers/mod.rs
pub mod forex_factory;
pub mod json_api;
pub mod mock;

use std::time::Duration;

use crate::config::{ConfigError, PipelineConfig, SourceKind};
use crate::ingest::types::CalendarSource;

use self::forex_factory::ForexFactoryProvider;
use self::json_api::{JsonApiProvider, JsonApiQuery};
use self::mock::MockCalendarProvider;

/// Build the configured source. The pipeline only ever sees the trait object.
pub fn build_source(cfg: &PipelineConfig) -> Result<Box<dyn CalendarSource>, ConfigError> {
    let source: Box<dyn CalendarSource> = match cfg.source {
        SourceKind::Mock => Box::new(MockCalendarProvider::new()),
        SourceKind::ForexFactory => Box::new(ForexFactoryProvider::from_url(&cfg.forex_factory_url)),
        SourceKind::JsonApi => {
            let url = cfg
                .json_api_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or(ConfigError::MissingField {
                    field: "json_api_url",
                })?;
            let query = JsonApiQuery {
                importance: cfg.json_api_importance.clone(),
                locale: cfg.json_api_locale.clone(),
                days_ahead: cfg.json_api_days_ahead,
                timeout: Duration::from_secs(cfg.json_api_timeout_secs),
            };
            Box::new(JsonApiProvider::new(url, query))
        }
    };
    tracing::info!(source = source.name(), "calendar source selected");
    Ok(source)
}
