//! Stage statistics for a cleaning run
//!
//! Counts are recorded one stage boundary at a time through
//! [`StatsBuilder`]. Each stage's "before" count is the previous stage's
//! "after" count, so removals always reconcile with the totals.

use crate::Result;
use chrono::{DateTime, Local};
use cleanset_formats::append_csv_row;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// A pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Dedup,
    Normalize,
    LengthFilter,
    LanguageFilter,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Dedup => "dedup",
            Stage::Normalize => "normalize",
            Stage::LengthFilter => "length_filter",
            Stage::LanguageFilter => "lang_filter",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counts at one stage boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSnapshot {
    pub stage: Stage,
    pub before: usize,
    pub after: usize,
    /// The stage was disabled and passed its input through
    pub skipped: bool,
}

impl StageSnapshot {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Append-only recorder of stage snapshots
#[derive(Debug, Clone)]
pub struct StatsBuilder {
    initial_count: usize,
    snapshots: Vec<StageSnapshot>,
}

impl StatsBuilder {
    pub fn new(initial_count: usize) -> Self {
        Self {
            initial_count,
            snapshots: Vec::with_capacity(4),
        }
    }

    /// Count after the last recorded stage
    pub fn current(&self) -> usize {
        self.snapshots
            .last()
            .map_or(self.initial_count, |snapshot| snapshot.after)
    }

    /// Record that `stage` finished with `after` records
    ///
    /// Panics if `after` exceeds the stage's input, since stages only remove.
    pub fn record(&mut self, stage: Stage, after: usize) -> StageSnapshot {
        let before = self.current();
        assert!(
            after <= before,
            "stage {} grew the dataset from {} to {}",
            stage,
            before,
            after
        );

        let snapshot = StageSnapshot {
            stage,
            before,
            after,
            skipped: false,
        };
        self.snapshots.push(snapshot);
        snapshot
    }

    /// Record that `stage` was disabled and passed everything through
    pub fn skip(&mut self, stage: Stage) -> StageSnapshot {
        let count = self.current();
        let snapshot = StageSnapshot {
            stage,
            before: count,
            after: count,
            skipped: true,
        };
        self.snapshots.push(snapshot);
        snapshot
    }

    pub fn snapshots(&self) -> &[StageSnapshot] {
        &self.snapshots
    }

    fn after(&self, stage: Stage) -> Option<usize> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.stage == stage)
            .map(|snapshot| snapshot.after)
    }

    /// Finalize into immutable statistics
    ///
    /// A stage that was never recorded counts as a pass-through of the
    /// stage before it.
    pub fn finish(self) -> StageStatistics {
        let initial_count = self.initial_count;
        let after_dedup = self.after(Stage::Dedup).unwrap_or(initial_count);
        let after_normalize = self.after(Stage::Normalize).unwrap_or(after_dedup);
        let after_length_filter = self.after(Stage::LengthFilter).unwrap_or(after_normalize);
        let after_lang_filter = self
            .after(Stage::LanguageFilter)
            .unwrap_or(after_length_filter);
        let final_count = self.current();

        StageStatistics {
            initial_count,
            after_dedup,
            after_length_filter,
            after_lang_filter,
            final_count,
            duplicates_removed: initial_count - after_dedup,
            length_filtered: after_normalize - after_length_filter,
            lang_filtered: after_length_filter - after_lang_filter,
            total_removed: initial_count - final_count,
        }
    }
}

/// Finalized per-stage counts of a cleaning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageStatistics {
    initial_count: usize,
    after_dedup: usize,
    after_length_filter: usize,
    after_lang_filter: usize,
    final_count: usize,
    duplicates_removed: usize,
    length_filtered: usize,
    lang_filtered: usize,
    total_removed: usize,
}

impl StageStatistics {
    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn after_dedup(&self) -> usize {
        self.after_dedup
    }

    pub fn after_length_filter(&self) -> usize {
        self.after_length_filter
    }

    pub fn after_lang_filter(&self) -> usize {
        self.after_lang_filter
    }

    pub fn final_count(&self) -> usize {
        self.final_count
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    pub fn length_filtered(&self) -> usize {
        self.length_filtered
    }

    pub fn lang_filtered(&self) -> usize {
        self.lang_filtered
    }

    pub fn total_removed(&self) -> usize {
        self.total_removed
    }

    /// Percentage of input records removed across all stages
    pub fn removal_rate(&self) -> f64 {
        if self.initial_count == 0 {
            0.0
        } else {
            (self.total_removed as f64 / self.initial_count as f64) * 100.0
        }
    }

    /// Flat stage-name to count mapping, in pipeline order
    pub fn as_pairs(&self) -> [(&'static str, usize); 9] {
        [
            ("initial_count", self.initial_count),
            ("after_dedup", self.after_dedup),
            ("after_length_filter", self.after_length_filter),
            ("after_lang_filter", self.after_lang_filter),
            ("final_count", self.final_count),
            ("duplicates_removed", self.duplicates_removed),
            ("length_filtered", self.length_filtered),
            ("lang_filtered", self.lang_filtered),
            ("total_removed", self.total_removed),
        ]
    }

    /// One row of the running cleaning log
    pub fn log_entry(&self, timestamp: DateTime<Local>) -> StatsLogEntry {
        StatsLogEntry {
            initial_count: self.initial_count,
            after_dedup: self.after_dedup,
            after_length_filter: self.after_length_filter,
            after_lang_filter: self.after_lang_filter,
            final_count: self.final_count,
            duplicates_removed: self.duplicates_removed,
            length_filtered: self.length_filtered,
            lang_filtered: self.lang_filtered,
            total_removed: self.total_removed,
            timestamp: timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        }
    }
}

/// Statistics plus the time they were logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsLogEntry {
    pub initial_count: usize,
    pub after_dedup: usize,
    pub after_length_filter: usize,
    pub after_lang_filter: usize,
    pub final_count: usize,
    pub duplicates_removed: usize,
    pub length_filtered: usize,
    pub lang_filtered: usize,
    pub total_removed: usize,
    pub timestamp: String,
}

/// Append this run's statistics to the CSV log at `path`
///
/// The header is written only when the log is new.
pub fn append_stats_log(path: &Path, stats: &StageStatistics) -> Result<StatsLogEntry> {
    let entry = stats.log_entry(Local::now());
    append_csv_row(path, &entry)?;
    info!("Cleaning statistics appended to {:?}", path);
    Ok(entry)
}
