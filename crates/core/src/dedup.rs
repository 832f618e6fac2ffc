//! Exact deduplication by content fingerprint
//!
//! The first record seen for each distinct text wins; later records with
//! byte-identical text are dropped. Relative order of survivors is kept.

use crate::hash::{fingerprint_text, to_hex, Fingerprint};
use cleanset_formats::Record;
use std::collections::HashSet;
use tracing::{debug, info};

/// Tracks seen fingerprints for deduplication
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: HashSet<Fingerprint>,
}

impl DedupTracker {
    /// Create a new deduplication tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Check if a fingerprint has been seen before
    /// Returns true if this is a duplicate
    pub fn is_duplicate(&mut self, fingerprint: Fingerprint) -> bool {
        !self.seen.insert(fingerprint)
    }

    /// Get the number of unique items seen
    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }
}

/// Statistics for a deduplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub total_seen: usize,
    pub duplicates_found: usize,
    pub unique_count: usize,
}

impl DedupStats {
    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Exact deduplicator over record texts
#[derive(Debug, Default)]
pub struct ExactDeduplicator {
    tracker: DedupTracker,
    stats: DedupStats,
}

impl ExactDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tracker: DedupTracker::with_capacity(capacity),
            stats: DedupStats::default(),
        }
    }

    /// Check if a text duplicates one seen earlier, remembering it if not
    pub fn is_duplicate(&mut self, text: &str) -> bool {
        self.stats.total_seen += 1;

        let fingerprint = fingerprint_text(text);
        if self.tracker.is_duplicate(fingerprint) {
            debug!("Duplicate text, fingerprint {}", to_hex(&fingerprint));
            self.stats.duplicates_found += 1;
            true
        } else {
            self.stats.unique_count += 1;
            false
        }
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    /// Keep the first record of each distinct text, in input order
    pub fn deduplicate(&mut self, dataset: Vec<Record>) -> Vec<Record> {
        dataset
            .into_iter()
            .filter(|record| !self.is_duplicate(&record.text))
            .collect()
    }
}

/// Remove records whose text is byte-identical to an earlier record
pub fn remove_duplicates(dataset: Vec<Record>) -> Vec<Record> {
    let mut deduplicator = ExactDeduplicator::with_capacity(dataset.len());
    let kept = deduplicator.deduplicate(dataset);

    let stats = deduplicator.stats();
    info!(
        "Deduplication: {} records, {} duplicates removed ({:.1}%)",
        stats.total_seen,
        stats.duplicates_found,
        stats.dedup_rate()
    );

    kept
}
