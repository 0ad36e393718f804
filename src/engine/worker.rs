//! Generator worker: expands its word chunk into candidates and hands the
//! ones nobody has stored yet to the writer.

use opentelemetry::KeyValue;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};

use super::channel::{CandidateSender, PushOutcome};
use crate::error::{Error, Result};
use crate::generate::CandidateSource;
use crate::model::SeenSet;
use crate::store::Store;
use crate::telemetry::metrics;
use crate::telemetry::pipeline::start_worker_span;

/// Counters reported by a worker when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Completed passes over the chunk.
    pub passes: u64,
    pub generated: u64,
    pub skipped_seen: u64,
    pub skipped_stored: u64,
    pub enqueued: u64,
    pub store_errors: u64,
}

/// One producer. Owns its word chunk, its store connection and its
/// [`SeenSet`]; shares only the channel and the cancellation token.
pub struct GeneratorWorker<S: CandidateSource> {
    id: usize,
    words: Vec<String>,
    source: Arc<S>,
    store: Store,
    tx: CandidateSender,
    token: CancellationToken,
    rng: StdRng,
    max_passes: Option<u64>,
}

impl<S: CandidateSource> GeneratorWorker<S> {
    pub fn new(
        id: usize,
        words: Vec<String>,
        source: Arc<S>,
        store: Store,
        tx: CandidateSender,
        token: CancellationToken,
    ) -> Self {
        Self {
            id,
            words,
            source,
            store,
            tx,
            token,
            rng: StdRng::from_os_rng(),
            max_passes: None,
        }
    }

    /// Make the per-pass word order reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Stop after `max_passes` full passes. `None` runs until cancelled.
    pub fn with_max_passes(mut self, max_passes: Option<u64>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Generate until cancelled (or the pass limit is reached).
    ///
    /// Each pass reshuffles the chunk; the candidates themselves are the same
    /// every pass, so repeats end at the seen set. Cancellation is checked before every
    /// candidate, and a push blocked on a full channel gives up as soon as
    /// the token fires. Store lookup failures are logged and the candidate
    /// is skipped; it comes around again on the next pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the writer is gone.
    pub async fn run(self) -> Result<WorkerReport> {
        let span = start_worker_span(self.id, self.words.len());
        self.generate().instrument(span).await
    }

    async fn generate(self) -> Result<WorkerReport> {
        let Self {
            id,
            mut words,
            source,
            store,
            tx,
            token,
            mut rng,
            max_passes,
        } = self;

        let labels = [KeyValue::new("worker", id as i64)];
        let generated = metrics::candidates_generated();
        let enqueued = metrics::candidates_enqueued();
        let skipped = metrics::candidates_skipped();
        let store_errors = metrics::store_errors();

        let mut seen = SeenSet::new();
        let mut report = WorkerReport {
            worker_id: id,
            ..Default::default()
        };

        debug!(words = words.len(), "worker started");

        'passes: while !token.is_cancelled() {
            if max_passes.is_some_and(|max| report.passes >= max) {
                break;
            }
            words.shuffle(&mut rng);

            for word in &words {
                for variant in source.variations(word) {
                    if token.is_cancelled() {
                        break 'passes;
                    }

                    let candidate = source.enhance(variant);
                    report.generated += 1;
                    generated.add(1, &labels);

                    if seen.contains(&candidate) {
                        report.skipped_seen += 1;
                        skipped.add(1, &[KeyValue::new("reason", "seen")]);
                        continue;
                    }

                    match store.exists(&candidate).await {
                        Ok(true) => {
                            report.skipped_stored += 1;
                            skipped.add(1, &[KeyValue::new("reason", "stored")]);
                            seen.insert(candidate);
                        }
                        Ok(false) => match tx.push(candidate.clone(), &token).await {
                            PushOutcome::Pushed => {
                                report.enqueued += 1;
                                enqueued.add(1, &labels);
                                seen.insert(candidate);
                            }
                            PushOutcome::Cancelled => break 'passes,
                            // The writer closes the channel on shutdown.
                            PushOutcome::Closed if token.is_cancelled() => break 'passes,
                            PushOutcome::Closed => {
                                warn!(worker = id, "candidate channel closed, stopping");
                                store.close().await;
                                return Err(Error::ChannelClosed);
                            }
                        },
                        Err(e) => {
                            report.store_errors += 1;
                            store_errors.add(1, &[KeyValue::new("operation", "exists")]);
                            warn!(worker = id, "store lookup failed, skipping candidate: {e}");
                        }
                    }
                }

                // Passes over already-seen words never touch the store, so
                // give the runtime a scheduling point per word.
                tokio::task::yield_now().await;
            }

            report.passes += 1;
            debug!(worker = id, pass = report.passes, seen = seen.len(), "pass complete");
        }

        Span::current().record("worker.passes", report.passes);
        info!(
            worker = id,
            passes = report.passes,
            generated = report.generated,
            enqueued = report.enqueued,
            "worker stopped"
        );
        store.close().await;
        Ok(report)
    }
}
