//! Supervisor: starts the pipeline, owns the cancellation token, reports
//! progress, and joins everything in order on shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::channel::{ChannelGauge, channel};
use super::worker::{GeneratorWorker, WorkerReport};
use super::writer::{BatchWriter, WriterReport};
use crate::config::Config;
use crate::dictionary::partition;
use crate::error::Result;
use crate::generate::CandidateSource;
use crate::store::Store;

/// Live-worker accounting shared with monitors and tests.
///
/// The active count only goes up while workers are being spawned and only
/// goes down as they exit; dead workers are never restarted.
#[derive(Debug, Clone, Default)]
pub struct Liveness {
    active: Arc<AtomicUsize>,
    spawned: Arc<AtomicUsize>,
}

impl Liveness {
    /// Workers currently running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Workers started so far.
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Acquire)
    }

    fn enter(&self) -> LivenessGuard {
        self.spawned.fetch_add(1, Ordering::AcqRel);
        self.active.fetch_add(1, Ordering::AcqRel);
        LivenessGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// Decrements the active count when a worker task ends, including by panic.
struct LivenessGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub words: usize,
    pub workers: usize,
    /// Workers that ended with an error or a panic.
    pub failed_workers: usize,
    pub passes: u64,
    pub generated: u64,
    pub skipped_seen: u64,
    pub skipped_stored: u64,
    pub enqueued: u64,
    pub store_errors: u64,
    pub writer: WriterReport,
}

impl RunSummary {
    fn absorb(&mut self, report: WorkerReport) {
        self.passes += report.passes;
        self.generated += report.generated;
        self.skipped_seen += report.skipped_seen;
        self.skipped_stored += report.skipped_stored;
        self.enqueued += report.enqueued;
        self.store_errors += report.store_errors;
    }
}

/// Runs one generation pipeline over a word list.
pub struct Supervisor<S: CandidateSource> {
    config: Arc<Config>,
    source: Arc<S>,
    token: CancellationToken,
    liveness: Liveness,
}

impl<S: CandidateSource> Supervisor<S> {
    pub fn new(config: Arc<Config>, source: S) -> Self {
        Self {
            config,
            source: Arc::new(source),
            token: CancellationToken::new(),
            liveness: Liveness::default(),
        }
    }

    /// The token every component polls. Cancelling it starts a graceful
    /// shutdown; it is never reset.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Cancel the token on SIGINT or SIGTERM. Nothing is killed directly.
    pub fn install_signal_handlers(&self) -> Result<()> {
        #[cfg(unix)]
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        let token = self.token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
            #[cfg(not(unix))]
            let _ = tokio::signal::ctrl_c().await;

            info!("shutting down gracefully");
            token.cancel();
        });

        Ok(())
    }

    /// Run the pipeline over `words` until cancelled, or until every worker
    /// has finished its configured passes.
    ///
    /// Startup opens every store connection before spawning anything, so a
    /// bad database path fails fast. Once running, no component failure
    /// aborts the run: failed workers are logged and counted.
    pub async fn run(self, words: Vec<String>) -> Result<RunSummary> {
        let config = Arc::clone(&self.config);
        let pipeline = &config.pipeline;
        let db_path = &config.storage.db_path;

        let word_count = words.len();
        let chunks = partition(words, pipeline.worker_count());

        let writer_store = Store::open(db_path).await?;
        let mut worker_stores = Vec::with_capacity(chunks.len());
        for _ in 0..chunks.len() {
            worker_stores.push(Store::open(db_path).await?);
        }

        info!(
            words = word_count,
            workers = chunks.len(),
            db = %db_path.display(),
            "starting pipeline"
        );

        let (tx, rx) = channel(pipeline.channel_capacity);
        let gauge = tx.gauge();

        let writer = BatchWriter::new(
            rx,
            writer_store,
            self.token.clone(),
            pipeline.batch_size,
            pipeline.poll_interval(),
        );
        let writer_handle = tokio::spawn(writer.run());

        let mut workers = Vec::with_capacity(chunks.len());
        for (id, (chunk, store)) in chunks.into_iter().zip(worker_stores).enumerate() {
            let mut worker = GeneratorWorker::new(
                id,
                chunk,
                Arc::clone(&self.source),
                store,
                tx.clone(),
                self.token.clone(),
            )
            .with_max_passes(pipeline.max_passes);
            if let Some(seed) = pipeline.seed {
                worker = worker.with_seed(seed.wrapping_add(id as u64));
            }

            let guard = self.liveness.enter();
            workers.push(tokio::spawn(async move {
                let _guard = guard;
                worker.run().await
            }));
        }
        // The channel closes once every worker has dropped its sender.
        drop(tx);

        self.monitor(&gauge).await;

        // Workers first, writer last: only the writer performs the final
        // flush, so it must outlive every producer.
        let mut summary = RunSummary {
            words: word_count,
            workers: workers.len(),
            ..Default::default()
        };
        for (id, handle) in workers.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(report)) => summary.absorb(report),
                Ok(Err(e)) => {
                    summary.failed_workers += 1;
                    error!(worker = id, "worker failed: {e}");
                }
                Err(e) => {
                    summary.failed_workers += 1;
                    error!(worker = id, "worker panicked: {e}");
                }
            }
        }
        summary.writer = writer_handle.await??;

        info!(
            enqueued = summary.enqueued,
            inserted = summary.writer.inserted,
            failed_workers = summary.failed_workers,
            "shutdown complete"
        );
        Ok(summary)
    }

    /// Periodically report queue depth and live workers until cancellation,
    /// or until no worker is left running. Purely observational.
    async fn monitor(&self, gauge: &ChannelGauge) {
        let mut ticker = tokio::time::interval(self.config.pipeline.monitor_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let mut last_active = self.liveness.active();
        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {
                    let active = self.liveness.active();
                    info!(queue = gauge.depth(), active, "pipeline progress");

                    if active == 0 {
                        info!("all workers finished");
                        break;
                    }
                    if active < last_active && self.config.pipeline.max_passes.is_none() {
                        warn!(
                            active,
                            spawned = self.liveness.spawned(),
                            "worker exited before shutdown, throughput reduced"
                        );
                    }
                    last_active = active;
                }
            }
        }
    }
}
