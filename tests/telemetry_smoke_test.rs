//! Smoke test: a short pipeline run with telemetry initialized, exercising
//! every span and instrument on the real code path.

use leetforge::config::Config;
use leetforge::engine::Supervisor;
use leetforge::generate::Leetspeak;
use leetforge::telemetry::{TelemetryConfig, init_telemetry};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pipeline_run_with_telemetry() {
    let mut config = Config::default();
    let _guard = init_telemetry(TelemetryConfig::from_settings(
        &config.telemetry,
        "leetforge-smoke",
    ));

    let dir = tempfile::tempdir().unwrap();
    config.storage.db_path = dir.path().join("passwords.db");
    config.pipeline.workers = Some(2);
    config.pipeline.max_passes = Some(1);
    config.pipeline.poll_interval_ms = 20;
    config.pipeline.monitor_interval_ms = 20;

    let source = Leetspeak::from_config(&config.generation);
    let summary = Supervisor::new(Arc::new(config), source)
        .run(vec!["sun".to_string(), "bird".to_string()])
        .await
        .unwrap();

    assert_eq!(summary.failed_workers, 0);
    assert!(summary.writer.inserted > 0);
}
