//! Batch extraction worker binary.
//!
//! Reads a queue event (`{"Records": [{"messageId", "body"}, ...]}`) from
//! `BATCH_EVENT_PATH` or stdin, processes every message and prints the
//! partial-failure report as JSON on stdout.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use framehue_media::{FfmpegFrameSource, FfmpegSourceConfig};
use framehue_models::BatchEvent;
use framehue_worker::{BatchProcessor, ColorExtractionService, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    if let Err(e) = run().await {
        error!("Worker error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("framehue=info".parse().expect("valid directive"));

    // Logs go to stderr so stdout carries only the report.
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting framehue-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let source = FfmpegFrameSource::new(FfmpegSourceConfig::from_env())
        .context("Failed to create frame source")?;
    let service = ColorExtractionService::from_config(&config, Arc::new(source));
    let processor = BatchProcessor::new(service);

    let raw = read_event().context("Failed to read batch event")?;
    let event: BatchEvent = serde_json::from_str(&raw).context("Failed to parse batch event")?;

    let report = processor.process(&event.records).await;

    let sqs_format = std::env::var("BATCH_RESPONSE_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("sqs"))
        .unwrap_or(false);
    let output = if sqs_format {
        serde_json::to_string(&report.to_sqs_response())?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

fn read_event() -> anyhow::Result<String> {
    match std::env::var("BATCH_EVENT_PATH") {
        Ok(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path)),
        Err(_) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
