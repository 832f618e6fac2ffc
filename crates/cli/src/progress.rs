//! Progress reporting and summary output for the CLI

use std::path::Path;
use std::time::{Duration, Instant};

use cleanset_core::{PipelineObserver, Stage, StageSnapshot, StageStatistics, Status};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner that follows the pipeline from stage to stage
pub struct StageProgress {
    bar: ProgressBar,
    start_time: Instant,
}

impl StageProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    /// Spinner that draws nothing, for `--json` output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            start_time: Instant::now(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message(format!(
            "Complete in {:.2}s",
            self.start_time.elapsed().as_secs_f64()
        ));
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for StageProgress {
    fn on_stage_start(&mut self, stage: Stage, input_count: usize) {
        self.bar.set_message(format!(
            "{}: {} records",
            stage,
            format_with_commas(input_count)
        ));
    }

    fn on_stage_complete(&mut self, snapshot: &StageSnapshot) {
        let message = if snapshot.skipped {
            format!("{}: skipped", snapshot.stage)
        } else {
            format!(
                "{}: {} removed",
                snapshot.stage,
                format_with_commas(snapshot.removed())
            )
        };
        self.bar.println(format!("  ✓ {}", message));
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Print a formatted summary report
pub fn print_summary_report(
    input: &Path,
    output: Option<&Path>,
    stats: &StageStatistics,
    status: Option<Status>,
) {
    let total = stats.initial_count();

    println!("\n{}", "═".repeat(60));
    println!("Dataset Cleaning Complete");
    println!("{}", "═".repeat(60));
    println!("Input:              {}", input.display());

    if let Some(output_path) = output {
        println!("Output:             {}", output_path.display());
    } else {
        println!("Output:             (dry run - no output written)");
    }

    println!("Total records:      {}", format_with_commas(total));
    println!(
        "Duplicates removed: {} ({:.1}%)",
        format_with_commas(stats.duplicates_removed()),
        percent(stats.duplicates_removed(), total)
    );
    println!(
        "Length filtered:    {} ({:.1}%)",
        format_with_commas(stats.length_filtered()),
        percent(stats.length_filtered(), total)
    );
    println!(
        "Language filtered:  {} ({:.1}%)",
        format_with_commas(stats.lang_filtered()),
        percent(stats.lang_filtered(), total)
    );
    println!(
        "Final dataset:      {} ({:.1}% removed)",
        format_with_commas(stats.final_count()),
        stats.removal_rate()
    );

    match status {
        Some(Status::Pass) => println!("Validation:         PASS"),
        Some(Status::Fail) => println!("Validation:         FAIL"),
        None => {}
    }

    println!("{}", "═".repeat(60));
}

/// Format number with thousand separators
pub fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
