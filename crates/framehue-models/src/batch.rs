//! Batch message and partial-failure report types.

use serde::{Deserialize, Serialize};

/// One message of a batch. `body` is a serialized extraction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMessage {
    pub message_id: String,
    pub body: String,
}

impl BatchMessage {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

/// Queue event envelope (`{"Records": [...]}`).
///
/// Unknown record attributes are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<BatchMessage>,
}

/// Outcome of a batch: only failed message ids are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub failed_message_ids: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed_message_ids.is_empty()
    }

    /// Render in the SQS partial batch response shape.
    pub fn to_sqs_response(&self) -> SqsBatchResponse {
        SqsBatchResponse {
            batch_item_failures: self
                .failed_message_ids
                .iter()
                .map(|id| BatchItemFailure {
                    item_identifier: id.clone(),
                })
                .collect(),
        }
    }
}

/// SQS partial batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsBatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ignores_extra_attributes() {
        let json = r#"{
            "Records": [
                {"messageId": "m-1", "receiptHandle": "abc", "body": "{}", "eventSource": "aws:sqs"}
            ]
        }"#;
        let event: BatchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.records, vec![BatchMessage::new("m-1", "{}")]);
    }

    #[test]
    fn test_sqs_response_shape() {
        let report = BatchReport {
            failed_message_ids: vec!["2".to_string(), "4".to_string()],
        };
        let value = serde_json::to_value(report.to_sqs_response()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "batchItemFailures": [{"itemIdentifier": "2"}, {"itemIdentifier": "4"}]
            })
        );
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"failedMessageIds": ["2", "4"]})
        );
    }
}
