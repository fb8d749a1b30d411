//! Renders the mock calendar through every format variant (forwarding only when TELEGRAM_SERVICE_URL is set).

use economic_calendar_relay::config::SourceKind;
use economic_calendar_relay::{CalendarPipeline, FormatVariant, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    for format in [FormatVariant::Digest, FormatVariant::Alert, FormatVariant::Signal] {
        let mut cfg = PipelineConfig::load()?;
        cfg.source = SourceKind::Mock;
        cfg.format = format;

        let report = CalendarPipeline::from_config(&cfg)?.run().await?;
        println!("===== {format:?} ({:?}) =====", report.delivery);
        println!("{}", serde_json::to_string_pretty(&report.output)?);
    }

    println!("calendar-demo done");
    Ok(())
}
