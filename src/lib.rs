//! # leetforge
//!
//! Turns a seed word list into leetspeak password candidates and durably
//! records every candidate not seen before in SQLite.
//!
//! Generator workers feed a bounded channel drained by a single batching
//! writer; a supervisor owns the cancellation token and joins everything in
//! order on shutdown.

pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod generate;
pub mod model;
pub mod store;
pub mod telemetry;
