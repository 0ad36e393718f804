//! Bounded hand-off between generator workers and the batch writer.
//!
//! Many producers share cloned [`CandidateSender`]s; the writer owns the
//! single [`CandidateReceiver`]. A full channel makes `push` wait, which is
//! what bounds memory when the store falls behind. Both ends keep observing
//! cancellation while they wait.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::Candidate;

/// Create a bounded candidate channel. A capacity of zero is treated as one.
pub fn channel(capacity: usize) -> (CandidateSender, CandidateReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let gauge = ChannelGauge {
        depth: Arc::new(AtomicUsize::new(0)),
        capacity,
    };
    (
        CandidateSender {
            tx,
            gauge: gauge.clone(),
        },
        CandidateReceiver { rx, gauge },
    )
}

/// What happened to a pushed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The candidate is in the channel.
    Pushed,
    /// Cancellation fired before a slot became free; the candidate was dropped.
    Cancelled,
    /// The receiver is gone.
    Closed,
}

/// Result of a timed pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    Item(Candidate),
    TimedOut,
    /// Every sender is gone and the channel is drained.
    Closed,
}

/// Read-only view of channel occupancy, for monitoring.
#[derive(Debug, Clone)]
pub struct ChannelGauge {
    depth: Arc<AtomicUsize>,
    capacity: usize,
}

impl ChannelGauge {
    /// Candidates currently queued.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer end. Cheap to clone; the channel closes when the last clone drops.
#[derive(Debug, Clone)]
pub struct CandidateSender {
    tx: mpsc::Sender<Candidate>,
    gauge: ChannelGauge,
}

impl CandidateSender {
    /// Push a candidate, waiting for a free slot while the channel is full.
    ///
    /// Returns [`PushOutcome::Cancelled`] instead of waiting forever once
    /// `token` fires.
    pub async fn push(&self, candidate: Candidate, token: &CancellationToken) -> PushOutcome {
        if token.is_cancelled() {
            return PushOutcome::Cancelled;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => PushOutcome::Cancelled,
            permit = self.tx.reserve() => match permit {
                Ok(permit) => {
                    // Count before the item becomes visible so the receiver
                    // never decrements below zero.
                    self.gauge.depth.fetch_add(1, Ordering::AcqRel);
                    permit.send(candidate);
                    PushOutcome::Pushed
                }
                Err(_) => PushOutcome::Closed,
            },
        }
    }

    pub fn gauge(&self) -> ChannelGauge {
        self.gauge.clone()
    }
}

/// Consumer end. There is exactly one.
#[derive(Debug)]
pub struct CandidateReceiver {
    rx: mpsc::Receiver<Candidate>,
    gauge: ChannelGauge,
}

impl CandidateReceiver {
    /// Wait up to `timeout` for the next candidate.
    pub async fn pop_timeout(&mut self, timeout: Duration) -> PopOutcome {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(candidate)) => {
                self.gauge.depth.fetch_sub(1, Ordering::AcqRel);
                PopOutcome::Item(candidate)
            }
            Ok(None) => PopOutcome::Closed,
            Err(_) => PopOutcome::TimedOut,
        }
    }

    /// Take the next candidate if one is already queued.
    pub fn try_pop(&mut self) -> Option<Candidate> {
        let candidate = self.rx.try_recv().ok()?;
        self.gauge.depth.fetch_sub(1, Ordering::AcqRel);
        Some(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.gauge.depth() == 0
    }

    /// Refuse further pushes. Candidates already queued, or being sent
    /// through a reserved slot, can still be popped; after that
    /// [`pop_timeout`](Self::pop_timeout) reports [`PopOutcome::Closed`].
    pub fn close(&mut self) {
        self.rx.close();
    }

    pub fn gauge(&self) -> ChannelGauge {
        self.gauge.clone()
    }
}
