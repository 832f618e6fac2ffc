//! Core cleaning logic for message datasets
//!
//! This crate runs the cleaning pipeline (exact dedup, normalization,
//! length and language filtering), keeps per-stage statistics and
//! gates the result behind a fail-fast validation pass.

pub mod config;
pub mod dedup;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod stats;
pub mod validation;

pub use config::CleaningConfig;
pub use dedup::{remove_duplicates, DedupStats, ExactDeduplicator};
pub use error::{Error, Result};
pub use pipeline::{clean_pipeline, CleanOutput, CleaningPipeline, NoopObserver, PipelineObserver};
pub use stats::{append_stats_log, Stage, StageSnapshot, StageStatistics, StatsLogEntry};
pub use validation::{
    run_validation, run_validation_records, Check, CheckDetail, Status, ValidationError,
    ValidationReport, Validator,
};
