//! Batch ingestion.
//!
//! Messages are processed one after another. A message fails when its body
//! cannot be parsed or its extraction fails; only failed message IDs are
//! reported and processing always moves on to the next message.

use framehue_models::{BatchMessage, BatchReport, ExtractionRequest, ExtractionResponse};
use tracing::{error, info};

use crate::error::ExtractionResult;
use crate::logging::ExtractionLogger;
use crate::metrics::record_batch_message;
use crate::service::ColorExtractionService;

pub struct BatchProcessor {
    service: ColorExtractionService,
}

impl BatchProcessor {
    pub fn new(service: ColorExtractionService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ColorExtractionService {
        &self.service
    }

    /// Process a batch and report the IDs of failed messages, in input order.
    pub async fn process(&self, messages: &[BatchMessage]) -> BatchReport {
        info!(count = messages.len(), "Processing batch");
        let mut report = BatchReport::default();

        for message in messages {
            match self.process_message(message).await {
                Ok(response) => {
                    record_batch_message("processed");
                    info!(
                        message_id = %message.message_id,
                        locator = %response.locator,
                        colors = response.results.len(),
                        "Processed message"
                    );
                    for result in &response.results {
                        info!(
                            message_id = %message.message_id,
                            "  {}ms -> {}", result.timestamp, result.color
                        );
                    }
                }
                Err(e) => {
                    record_batch_message("failed");
                    error!(
                        message_id = %message.message_id,
                        code = e.code(),
                        "Failed to process message: {}", e
                    );
                    report.failed_message_ids.push(message.message_id.clone());
                }
            }
        }

        info!(
            count = messages.len(),
            failed = report.failed_message_ids.len(),
            "Batch complete"
        );
        report
    }

    /// Parse one message body and run the extraction.
    pub async fn process_message(&self, message: &BatchMessage) -> ExtractionResult<ExtractionResponse> {
        let request: ExtractionRequest = serde_json::from_str(&message.body)?;
        let logger = ExtractionLogger::with_id(&message.message_id, "batch_message");
        self.service.extract_with_logger(&request, &logger).await
    }
}
