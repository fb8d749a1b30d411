// tests/pipeline_e2e.rs
//
// Full runs: mock source → formatter → fake notification service.
mod common;

use axum::http::StatusCode;

use economic_calendar_relay::config::SourceKind;
use economic_calendar_relay::notify::Delivery;
use economic_calendar_relay::pipeline::Stage;
use economic_calendar_relay::{CalendarPipeline, FormatVariant, FormattedOutput, PipelineConfig};

fn mock_config(format: FormatVariant, sink_url: Option<String>) -> PipelineConfig {
    PipelineConfig {
        source: SourceKind::Mock,
        format,
        sink_url,
        forward_timeout_secs: 5,
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn mock_digest_has_three_ordered_blocks_with_figures() {
    let report = CalendarPipeline::from_config(&mock_config(FormatVariant::Digest, None))
        .expect("pipeline")
        .run()
        .await
        .expect("run ok");

    assert_eq!(report.delivery, Delivery::Skipped);
    let FormattedOutput::Text(text) = &report.output else {
        panic!("digest must be text, got {:?}", report.output);
    };

    let blocks: Vec<&str> = text
        .trim_end()
        .split("\n\n")
        .skip(1) // header
        .collect();
    assert_eq!(blocks.len(), 3, "three event blocks expected:\n{text}");

    let times: Vec<&str> = blocks
        .iter()
        .map(|b| b.split(" | ").next().unwrap_or_default())
        .collect();
    assert_eq!(times, vec!["08:30", "10:00", "14:30"]);

    for b in &blocks {
        let detail = b.lines().nth(1).expect("detail line");
        assert!(detail.starts_with("(F: ") && detail.contains(" | P: "), "got '{detail}'");
        assert!(!detail.contains("A: "), "mock data has no actuals");
    }
}

#[tokio::test]
async fn digest_is_posted_as_message_to_calendar_route() {
    let (sink, captured) = common::spawn_sink(StatusCode::OK).await;
    let report = CalendarPipeline::from_config(&mock_config(FormatVariant::Digest, Some(sink)))
        .expect("pipeline")
        .run()
        .await
        .expect("run ok");

    assert_eq!(
        report.delivery,
        Delivery::Delivered {
            path: "/send_calendar",
            status: 200
        }
    );
    let reqs = captured.take();
    assert_eq!(reqs.len(), 1);
    let (path, body) = &reqs[0];
    assert_eq!(path, "/send_calendar");
    let FormattedOutput::Text(text) = &report.output else {
        panic!("digest must be text");
    };
    assert_eq!(body["message"].as_str(), Some(text.as_str()));
}

#[tokio::test]
async fn alert_and_signal_use_structured_routes() {
    let (sink, captured) = common::spawn_sink(StatusCode::OK).await;

    for format in [FormatVariant::Alert, FormatVariant::Signal] {
        CalendarPipeline::from_config(&mock_config(format, Some(format!("{sink}/"))))
            .expect("pipeline")
            .run()
            .await
            .expect("run ok");
    }

    let reqs = captured.take();
    assert_eq!(reqs.len(), 2);

    let (alert_path, alert) = &reqs[0];
    assert_eq!(alert_path, "/send_alert");
    assert!(alert["message"].as_str().unwrap_or_default().contains("Risk Management"));
    assert_eq!(alert["buttons"].as_array().map(Vec::len), Some(1));

    let (signal_path, signal) = &reqs[1];
    assert_eq!(signal_path, "/send_signal");
    assert_eq!(signal["primary_event"]["event"], "Non-Farm Employment Change");
    assert_eq!(signal["events"].as_array().map(Vec::len), Some(3));
    assert!(signal["stop_loss"].is_null());
}

#[tokio::test]
async fn sink_rejection_fails_the_run_but_keeps_output() {
    let (sink, captured) = common::spawn_sink(StatusCode::BAD_GATEWAY).await;
    let err = CalendarPipeline::from_config(&mock_config(FormatVariant::Digest, Some(sink)))
        .expect("pipeline")
        .run()
        .await
        .expect_err("502 must fail the run");

    assert_eq!(err.stage(), Stage::Forward);
    assert!(err.to_string().contains("502"), "got '{err}'");
    assert!(matches!(err.output(), Some(FormattedOutput::Text(_))));
    assert_eq!(captured.take().len(), 1, "exactly one POST, no retries");
}

#[tokio::test]
async fn concurrent_runs_are_independent() {
    let (sink, captured) = common::spawn_sink(StatusCode::OK).await;
    let pipeline = std::sync::Arc::new(
        CalendarPipeline::from_config(&mock_config(FormatVariant::Digest, Some(sink)))
            .expect("pipeline"),
    );

    let runs = (0..4).map(|_| {
        let p = pipeline.clone();
        tokio::spawn(async move { p.run().await })
    });
    for handle in runs.collect::<Vec<_>>() {
        let report = handle.await.expect("join").expect("run ok");
        assert_eq!(report.event_count, 3);
    }
    assert_eq!(captured.take().len(), 4);
}
