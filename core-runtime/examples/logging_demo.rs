//! Logging setup demonstration.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug builds)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # Compact format with a custom filter
//! cargo run --example logging_demo -- compact "core_runtime=trace"
//! ```

use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use tracing::{debug, info, instrument, span, trace, warn, Level};

fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default().with_format(format);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(error) = init_logging(config) {
        eprintln!("failed to initialize logging: {error}");
        return;
    }

    info!(format = ?format, "logging initialized");

    demo_log_levels();
    demo_structured_logging();
    demo_spans();

    info!("demo complete");
}

fn demo_log_levels() {
    let span = span!(Level::INFO, "log_levels");
    let _enter = span.enter();

    trace!("trace level");
    debug!("debug level");
    info!("info level");
    warn!("warn level");
}

fn demo_structured_logging() {
    let span = span!(Level::INFO, "structured_logging");
    let _enter = span.enter();

    info!(
        title = "Song Title",
        duration_ms = 245_000,
        format = "flac",
        "track information"
    );

    info!(tracks = 42, errors = 0, "scan summary");
}

fn demo_spans() {
    let span = span!(Level::INFO, "library_scan", folders = 2);
    let _enter = span.enter();

    info!("starting scan");

    {
        let inner = span!(Level::DEBUG, "enumerate");
        let _inner = inner.enter();
        debug!(count = 150, "enumerated candidate files");
    }

    probe_file("song.mp3");

    info!(tracks = 150, "scan completed");
}

#[instrument]
fn probe_file(name: &str) {
    trace!("reading tags");
}
