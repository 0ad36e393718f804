//! Metric instrument factories for leetforge.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"leetforge"` meter; without
//! an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for leetforge instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("leetforge")
}

/// Counter: candidates produced by a worker, before any dedup.
/// Labels: `worker`.
pub fn candidates_generated() -> Counter<u64> {
    meter()
        .u64_counter("leetforge.candidates.generated")
        .with_description("Number of candidates generated")
        .build()
}

/// Counter: candidates pushed onto the channel.
/// Labels: `worker`.
pub fn candidates_enqueued() -> Counter<u64> {
    meter()
        .u64_counter("leetforge.candidates.enqueued")
        .with_description("Number of candidates handed to the writer")
        .build()
}

/// Counter: candidates dropped by dedup.
/// Labels: `reason` ("seen" | "stored").
pub fn candidates_skipped() -> Counter<u64> {
    meter()
        .u64_counter("leetforge.candidates.skipped")
        .with_description("Number of candidates filtered as duplicates")
        .build()
}

/// Counter: failed store calls.
/// Labels: `operation` ("exists" | "insert_batch").
pub fn store_errors() -> Counter<u64> {
    meter()
        .u64_counter("leetforge.store.errors")
        .with_description("Number of failed store operations")
        .build()
}

/// Counter: rows newly persisted.
pub fn rows_inserted() -> Counter<u64> {
    meter()
        .u64_counter("leetforge.rows.inserted")
        .with_description("Number of candidates newly persisted")
        .build()
}

/// Histogram: batch flush duration in milliseconds.
pub fn flush_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("leetforge.flush.duration_ms")
        .with_description("Batch flush duration in milliseconds")
        .with_unit("ms")
        .build()
}
