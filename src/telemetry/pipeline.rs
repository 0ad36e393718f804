//! Span helpers for the generation pipeline.

use tracing::Span;

/// Start a span covering one generator worker's lifetime.
pub fn start_worker_span(worker_id: usize, words: usize) -> Span {
    tracing::info_span!(
        "pipeline.worker",
        "worker.id" = worker_id,
        "worker.words" = words,
        "worker.passes" = tracing::field::Empty,
    )
}

/// Start a span covering the batch writer's lifetime.
pub fn start_writer_span(batch_size: usize) -> Span {
    tracing::info_span!(
        "pipeline.writer",
        "writer.batch_size" = batch_size,
        "writer.flushes" = tracing::field::Empty,
    )
}

/// Record a completed flush on the given span.
///
/// Emits a tracing `info` event scoped to the span.
pub fn record_flush(span: &Span, rows: u64, batch: usize, duration_ms: f64) {
    span.in_scope(|| {
        tracing::info!(rows, batch, duration_ms, "inserted {rows} passwords");
    });
}
