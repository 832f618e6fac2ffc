//! Cleaning pipeline orchestration
//!
//! Runs the stages in a fixed order over one in-memory dataset:
//! deduplicate, normalize, filter by length, filter by language.
//! Only language classification runs in parallel (via Rayon); every
//! stage preserves the relative order of the records it keeps.

use crate::config::CleaningConfig;
use crate::dedup::remove_duplicates;
use crate::stats::{Stage, StageSnapshot, StageStatistics, StatsBuilder};
use cleanset_filters::{LanguageClassifier, LanguageFilter, TextNormalizer};
use cleanset_formats::{EnrichedRecord, Record};
use tracing::{debug, info};

/// Receives notifications at stage boundaries
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: Stage, _input_count: usize) {}

    fn on_stage_complete(&mut self, _snapshot: &StageSnapshot) {}
}

/// Observer that ignores every notification
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Output of a cleaning run
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub records: Vec<EnrichedRecord>,
    pub stats: StageStatistics,
}

/// The cleaning pipeline for one configuration
pub struct CleaningPipeline<'a> {
    config: CleaningConfig,
    normalizer: TextNormalizer,
    classifier: &'a LanguageClassifier,
}

impl<'a> CleaningPipeline<'a> {
    pub fn new(config: CleaningConfig, classifier: &'a LanguageClassifier) -> Self {
        let normalizer = TextNormalizer::from(config.punctuation);
        Self {
            config,
            normalizer,
            classifier,
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run every stage over `dataset`
    pub fn run(&self, dataset: Vec<Record>) -> CleanOutput {
        self.run_with_observer(dataset, &mut NoopObserver)
    }

    /// Run every stage, notifying `observer` at each boundary
    pub fn run_with_observer(
        &self,
        dataset: Vec<Record>,
        observer: &mut dyn PipelineObserver,
    ) -> CleanOutput {
        let mut stats = StatsBuilder::new(dataset.len());
        info!("Cleaning {} records", dataset.len());

        // 1. Exact deduplication on raw text
        observer.on_stage_start(Stage::Dedup, stats.current());
        let deduped = remove_duplicates(dataset);
        let snapshot = stats.record(Stage::Dedup, deduped.len());
        Self::complete(observer, &snapshot);

        // 2. Normalization
        observer.on_stage_start(Stage::Normalize, stats.current());
        let normalized: Vec<Record> = deduped
            .into_iter()
            .map(|record| Record {
                text: self.normalizer.normalize(&record.text),
                id: record.id,
            })
            .collect();
        let snapshot = stats.record(Stage::Normalize, normalized.len());
        Self::complete(observer, &snapshot);

        // 3. Length filter on normalized text
        observer.on_stage_start(Stage::LengthFilter, stats.current());
        let bounds = self.config.length_bounds();
        let in_range: Vec<(Record, usize)> = normalized
            .into_iter()
            .filter_map(|record| {
                let (accepted, length) = bounds.accepts(&record.text);
                if accepted {
                    Some((record, length))
                } else {
                    debug!("Length filter dropped record {} ({} chars)", record.id, length);
                    None
                }
            })
            .collect();
        let snapshot = stats.record(Stage::LengthFilter, in_range.len());
        Self::complete(observer, &snapshot);

        // 4. Language filter, when a target is configured
        observer.on_stage_start(Stage::LanguageFilter, stats.current());
        let records: Vec<EnrichedRecord> = match self.config.target_language() {
            Some(target) => {
                let filter = LanguageFilter::new(self.classifier, target);
                let (kept, lang_stats) =
                    filter.filter_by_language(in_range, |item| item.0.text.as_str());
                debug!("Language distribution: {:?}", lang_stats.lang_distribution);

                let snapshot = stats.record(Stage::LanguageFilter, kept.len());
                Self::complete(observer, &snapshot);

                kept.into_iter()
                    .map(|((record, length), lang)| EnrichedRecord {
                        id: record.id,
                        text: record.text,
                        text_length: length,
                        detected_lang: Some(lang),
                    })
                    .collect()
            }
            None => {
                let snapshot = stats.skip(Stage::LanguageFilter);
                Self::complete(observer, &snapshot);

                in_range
                    .into_iter()
                    .map(|(record, length)| EnrichedRecord {
                        id: record.id,
                        text: record.text,
                        text_length: length,
                        detected_lang: None,
                    })
                    .collect()
            }
        };

        let stats = stats.finish();
        info!(
            "Cleaning complete: {} -> {} records ({:.1}% removed)",
            stats.initial_count(),
            stats.final_count(),
            stats.removal_rate()
        );

        CleanOutput { records, stats }
    }

    fn complete(observer: &mut dyn PipelineObserver, snapshot: &StageSnapshot) {
        if snapshot.skipped {
            info!("Stage {}: skipped ({} records)", snapshot.stage, snapshot.after);
        } else {
            info!(
                "Stage {}: {} -> {} ({} removed)",
                snapshot.stage,
                snapshot.before,
                snapshot.after,
                snapshot.removed()
            );
        }
        observer.on_stage_complete(snapshot);
    }
}

/// Clean `dataset` with `config`, returning the survivors and stage counts
pub fn clean_pipeline(
    dataset: Vec<Record>,
    config: &CleaningConfig,
    classifier: &LanguageClassifier,
) -> (Vec<EnrichedRecord>, StageStatistics) {
    let output = CleaningPipeline::new(config.clone(), classifier).run(dataset);
    (output.records, output.stats)
}
