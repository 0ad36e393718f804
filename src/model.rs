//! Core data model.
//!
//! A candidate is a plain string with no identity beyond its text. It is
//! transient until the writer persists it as a [`PersistedRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A generated password-like string pending dedup and persistence.
pub type Candidate = String;

// ---------------------------------------------------------------------------
// Persisted Record
// ---------------------------------------------------------------------------

/// A row of the `passwords` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersistedRecord {
    /// Unique key. Re-inserting an existing password is a no-op.
    pub password: String,
    pub created: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Seen Set
// ---------------------------------------------------------------------------

/// Exact, unbounded set of candidates one worker has already handled.
///
/// Owned by a single worker for its lifetime and never shared or persisted.
/// Dedup through it is best-effort: two workers can still emit the same
/// candidate, and the store's insert-or-ignore settles that.
#[derive(Debug, Default)]
pub struct SeenSet {
    entries: HashSet<Candidate>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.entries.contains(candidate)
    }

    /// Returns `false` if the candidate was already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        self.entries.insert(candidate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Ordered candidates accumulated by the writer between flushes.
#[derive(Debug)]
pub struct Batch {
    items: Vec<Candidate>,
    limit: usize,
}

impl Batch {
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            items: Vec::with_capacity(limit.min(16_384)),
            limit,
        }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.items.push(candidate);
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }

    /// Empty the batch after a successful flush, keeping its allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
