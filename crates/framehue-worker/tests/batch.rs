mod common;

use common::{harness, StubSource};
use framehue_models::BatchMessage;
use framehue_worker::{BatchProcessor, ExtractionError};

fn body(locator: &str, timestamps: &[u64]) -> String {
    serde_json::json!({ "videoUrl": locator, "timestamps": timestamps }).to_string()
}

#[tokio::test]
async fn reports_only_failed_messages() {
    let h = harness(StubSource::new().with_duration("good", 10_000));
    let processor = BatchProcessor::new(h.service.clone());

    let messages = vec![
        BatchMessage::new("1", body("good", &[1_000])),
        BatchMessage::new("2", "{not json"),
        BatchMessage::new("3", body("good", &[2_000, 3_000])),
        BatchMessage::new("4", body("missing", &[1_000])),
        BatchMessage::new("5", body("good", &[4_000])),
    ];

    let report = processor.process(&messages).await;

    assert_eq!(report.failed_message_ids, vec!["2".to_string(), "4".to_string()]);
    // Messages 1, 3 and 5 each ran every frame.
    assert_eq!(h.source.capture_calls(), 4);
    // Message 4 reached the source; message 2 never did.
    assert_eq!(h.source.duration_calls(), 2);
}

#[tokio::test]
async fn clean_batch_has_no_failures() {
    let h = harness(StubSource::new().with_duration("good", 10_000));
    let processor = BatchProcessor::new(h.service.clone());

    let report = processor
        .process(&[BatchMessage::new("a", body("good", &[0, 10_000]))])
        .await;

    assert!(report.is_clean());
}

#[tokio::test]
async fn parse_failure_is_transport_error() {
    let h = harness(StubSource::new());
    let processor = BatchProcessor::new(h.service.clone());

    let err = processor
        .process_message(&BatchMessage::new("x", "[]"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::TransportParse(_)));
    assert_eq!(err.code(), "TRANSPORT_PARSE_ERROR");
}

#[tokio::test]
async fn validation_failure_fails_message() {
    let h = harness(StubSource::new().with_duration("good", 10_000));
    let processor = BatchProcessor::new(h.service.clone());

    let both = serde_json::json!({ "locator": "good", "timestamps": [1], "percentages": [1] }).to_string();
    let report = processor.process(&[BatchMessage::new("m", both)]).await;

    assert_eq!(report.failed_message_ids, vec!["m".to_string()]);
    assert_eq!(h.source.duration_calls(), 0);
}
