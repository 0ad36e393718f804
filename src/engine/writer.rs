//! Batch writer: the channel's only consumer and the only component that
//! writes to the store.

use opentelemetry::KeyValue;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info, warn};

use super::channel::{CandidateReceiver, PopOutcome};
use crate::error::Result;
use crate::model::Batch;
use crate::store::Store;
use crate::telemetry::metrics;
use crate::telemetry::pipeline::{record_flush, start_writer_span};

/// Counters reported by the writer when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterReport {
    /// Candidates taken off the channel.
    pub received: u64,
    /// Rows that were new to the store.
    pub inserted: u64,
    pub flushes: u64,
    /// Failed insert attempts; every one was retried.
    pub failed_flushes: u64,
}

/// Drains the channel into batches and flushes them to the store.
pub struct BatchWriter {
    rx: CandidateReceiver,
    store: Store,
    token: CancellationToken,
    batch_size: usize,
    poll_interval: Duration,
}

impl BatchWriter {
    pub fn new(
        rx: CandidateReceiver,
        store: Store,
        token: CancellationToken,
        batch_size: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            rx,
            store,
            token,
            batch_size,
            poll_interval,
        }
    }

    /// Consume until cancelled and drained, or until every producer is gone.
    ///
    /// Once cancellation is seen with an empty channel the channel is closed
    /// to producers and drained to the end, so every candidate a worker saw
    /// as pushed reaches the store.
    ///
    /// Full batches are flushed immediately. Whatever was already taken off
    /// the channel when the loop ends goes out in one final flush.
    pub async fn run(self) -> Result<WriterReport> {
        let span = start_writer_span(self.batch_size);
        self.drain(span.clone()).instrument(span).await
    }

    async fn drain(mut self, span: Span) -> Result<WriterReport> {
        let mut batch = Batch::with_limit(self.batch_size);
        let mut report = WriterReport::default();

        let mut closed = false;

        loop {
            if !closed && self.token.is_cancelled() && self.rx.is_empty() {
                // Nothing new gets in; a push that raced the check is still
                // drained below before the channel reports closed.
                self.rx.close();
                closed = true;
            }

            match self.rx.pop_timeout(self.poll_interval).await {
                PopOutcome::Item(candidate) => {
                    report.received += 1;
                    batch.push(candidate);
                    if batch.is_full() {
                        self.flush(&mut batch, &mut report, &span).await;
                    }
                }
                // Idle: loop around and re-check cancellation.
                PopOutcome::TimedOut => {}
                PopOutcome::Closed => break,
            }
        }

        if !batch.is_empty() {
            info!(batch = batch.len(), "flushing final partial batch");
            self.flush(&mut batch, &mut report, &span).await;
        }

        span.record("writer.flushes", report.flushes);
        info!(
            received = report.received,
            inserted = report.inserted,
            flushes = report.flushes,
            "writer stopped"
        );
        self.store.close().await;
        Ok(report)
    }

    /// Insert `batch`, retrying on failure until it lands.
    ///
    /// A failing store is retried one poll interval apart for as long as it
    /// takes, shutdown included: a dequeued candidate is never dropped.
    async fn flush(&self, batch: &mut Batch, report: &mut WriterReport, span: &Span) {
        loop {
            let started = Instant::now();
            match self.store.insert_batch(batch.as_slice()).await {
                Ok(rows) => {
                    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
                    metrics::rows_inserted().add(rows, &[]);
                    metrics::flush_duration_ms().record(duration_ms, &[]);
                    record_flush(span, rows, batch.len(), duration_ms);
                    report.inserted += rows;
                    report.flushes += 1;
                    batch.clear();
                    return;
                }
                Err(e) => {
                    report.failed_flushes += 1;
                    metrics::store_errors().add(1, &[KeyValue::new("operation", "insert_batch")]);
                    warn!(
                        batch = batch.len(),
                        attempt = report.failed_flushes,
                        shutting_down = self.token.is_cancelled(),
                        "flush failed, retrying: {e}"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
