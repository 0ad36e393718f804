//! Integration tests for telemetry initialization and span helpers.

use leetforge::config::{Config, TelemetrySettings};
use leetforge::engine::Supervisor;
use leetforge::generate::Leetspeak;
use leetforge::telemetry::{TelemetryConfig, init_telemetry, metrics, pipeline};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// In-memory log sink for a thread-local subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn telemetry_initializes_without_endpoint() {
    // Note: tracing subscriber can only be set once per process.
    // Using try_init() in the implementation avoids panics if another
    // test already initialized a subscriber.
    let config = TelemetryConfig {
        endpoint: None,
        service_name: "leetforge-test".to_string(),
        log_level: "debug".to_string(),
    };
    let _guard = init_telemetry(config);
}

#[test]
fn telemetry_config_follows_settings() {
    let settings = TelemetrySettings {
        otel_endpoint: Some("http://localhost:4317".to_string()),
        log_level: "warn".to_string(),
    };
    let config = TelemetryConfig::from_settings(&settings, "leetforge");
    assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4317"));
    assert_eq!(config.service_name, "leetforge");
    assert_eq!(config.log_level, "warn");
}

#[test]
fn worker_span_records_passes() {
    let span = pipeline::start_worker_span(3, 120);
    span.record("worker.passes", 2u64);
}

#[test]
fn writer_span_records_flushes() {
    let span = pipeline::start_writer_span(10_000);
    pipeline::record_flush(&span, 9_950, 10_000, 42.5);
    span.record("writer.flushes", 1u64);
}

#[test]
fn instruments_work_without_a_provider() {
    metrics::candidates_generated().add(1, &[]);
    metrics::rows_inserted().add(5, &[]);
    metrics::flush_duration_ms().record(1.5, &[]);
}

#[tokio::test]
async fn monitor_reports_progress_as_structured_fields() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    // Current-thread runtime: every spawned task logs through this subscriber.
    let _default = tracing::subscriber::set_default(subscriber);

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.db_path = dir.path().join("passwords.db");
    config.pipeline.workers = Some(1);
    config.pipeline.max_passes = Some(1);
    config.pipeline.poll_interval_ms = 10;
    config.pipeline.monitor_interval_ms = 10;

    let source = Leetspeak::from_config(&config.generation);
    Supervisor::new(Arc::new(config), source)
        .run(vec!["cat".to_string()])
        .await
        .unwrap();

    let text = captured.text();
    let line = text
        .lines()
        .find(|line| line.contains("pipeline progress"))
        .expect("no progress line logged");
    assert!(line.contains("queue="), "{line}");
    assert!(line.contains("active="), "{line}");
    assert!(!text.contains("Queue size"));
}
