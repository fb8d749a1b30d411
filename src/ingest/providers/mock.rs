// src/ingest/providers/mock.rs
use async_trait::async_trait;

use crate::ingest::types::{CalendarSource, EconomicEvent, FetchError, Impact};

/// Fixed demo calendar used when no live source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCalendarProvider;

impl MockCalendarProvider {
    pub fn new() -> Self {
        Self
    }

    /// The hardcoded calendar, in ascending time order.
    pub fn events() -> Vec<EconomicEvent> {
        // (time, currency, impact, title, forecast, previous)
        const FIXED: [(&str, &str, Impact, &str, &str, &str); 3] = [
            ("08:30", "USD", Impact::High, "Non-Farm Employment Change", "180K", "175K"),
            ("10:00", "USD", Impact::Medium, "ISM Services PMI", "52.0", "51.4"),
            ("14:30", "EUR", Impact::Low, "ECB Economic Bulletin", "0.2%", "0.1%"),
        ];

        FIXED
            .iter()
            .filter_map(|&(time, currency, impact, title, forecast, previous)| {
                EconomicEvent::new(time, currency, impact, title)
                    .ok()
                    .map(|ev| ev.with_figures(None, Some(forecast.into()), Some(previous.into())))
            })
            .collect()
    }
}

#[async_trait]
impl CalendarSource for MockCalendarProvider {
    async fn fetch(&self) -> Result<Vec<EconomicEvent>, FetchError> {
        Ok(Self::events())
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_three_sorted_events_without_actuals() {
        let evs = MockCalendarProvider::new().fetch().await.unwrap();
        assert_eq!(evs.len(), 3);
        assert!(evs.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(evs.iter().all(|e| e.actual.is_none()));
        assert!(evs.iter().all(|e| e.forecast.is_some() && e.previous.is_some()));
    }
}
