// src/format/signal.rs
use serde::Serialize;

use super::{POSITION_SIZE_NOTE, RISK_NOTES};
use crate::ingest::types::{EconomicEvent, Impact};

/// Payload for the trading-signal channel.
///
/// Calendar alerts carry no price levels, so `entry_price`, `stop_loss` and
/// `take_profit` are always serialized as `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignalPayload {
    pub signal_type: String,
    pub symbol: String,
    pub direction: String,
    pub message: String,
    pub primary_event: EconomicEvent,
    pub events: Vec<EconomicEvent>,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub risk_management: RiskNote,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RiskNote {
    pub position_size: String,
    pub notes: Vec<String>,
}

impl Default for RiskNote {
    fn default() -> Self {
        Self {
            position_size: POSITION_SIZE_NOTE.to_string(),
            notes: RISK_NOTES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// First high-impact event, else the first event.
pub fn select_primary(events: &[EconomicEvent]) -> Option<&EconomicEvent> {
    events
        .iter()
        .find(|e| e.impact == Impact::High)
        .or_else(|| events.first())
}

/// `None` for an empty calendar.
pub fn build(events: &[EconomicEvent]) -> Option<SignalPayload> {
    let primary = select_primary(events)?;
    Some(SignalPayload {
        signal_type: "ECONOMIC_CALENDAR".to_string(),
        symbol: primary.currency.clone(),
        direction: "NEUTRAL".to_string(),
        message: format!(
            "{} {} {} at {}",
            primary.impact.glyph(),
            primary.currency,
            primary.event,
            primary.time
        ),
        primary_event: primary.clone(),
        events: events.to_vec(),
        entry_price: None,
        stop_loss: None,
        take_profit: None,
        risk_management: RiskNote::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(title: &str, impact: Impact) -> EconomicEvent {
        EconomicEvent::new("10:00", "USD", impact, title).unwrap()
    }

    #[test]
    fn primary_is_first_high_impact() {
        let evs = vec![ev("E1", Impact::Low), ev("E2", Impact::High), ev("E3", Impact::High)];
        assert_eq!(select_primary(&evs).unwrap().event, "E2");
    }

    #[test]
    fn primary_falls_back_to_first_event() {
        let evs = vec![ev("E1", Impact::Low), ev("E2", Impact::Medium)];
        assert_eq!(select_primary(&evs).unwrap().event, "E1");
    }

    #[test]
    fn empty_list_has_no_payload() {
        assert!(select_primary(&[]).is_none());
        assert!(build(&[]).is_none());
    }

    #[test]
    fn payload_carries_all_events_and_no_price_levels() {
        let evs = vec![ev("E1", Impact::Medium), ev("E2", Impact::High)];
        let p = build(&evs).unwrap();
        assert_eq!(p.events, evs);
        assert_eq!(p.primary_event.event, "E2");
        assert_eq!(p.symbol, "USD");

        let v = serde_json::to_value(&p).unwrap();
        assert!(v["entry_price"].is_null());
        assert!(v["stop_loss"].is_null());
        assert!(v["take_profit"].is_null());
        assert_eq!(v["risk_management"]["notes"].as_array().unwrap().len(), RISK_NOTES.len());
        assert_eq!(v["primary_event"]["impact"], "high");
    }
}
