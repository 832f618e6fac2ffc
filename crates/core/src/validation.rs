//! Post-pipeline validation gate
//!
//! Checks run in a fixed order (schema, nulls, length, language) and stop
//! at the first failure. The report records the detail of every check that
//! ran, including the failing one, and is persisted before the failure is
//! handed back to the caller.

use crate::config::CleaningConfig;
use crate::{Error, Result};
use cleanset_filters::{text_length, LanguageClassifier, LengthFilterConfig, LengthVerdict};
use cleanset_formats::{write_json_pretty, EnrichedRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Fields every row must carry
pub const REQUIRED_FIELDS: [&str; 2] = ["id", "text"];

const TEXT_FIELD: &str = "text";
const LANG_FIELD: &str = "detected_lang";

/// A classified validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Column '{field}' contains {count} null values")]
    Nulls {
        field: String,
        count: usize,
        counts: BTreeMap<String, usize>,
    },

    #[error("Text length violation: {too_short} too short, {too_long} too long")]
    Length { too_short: usize, too_long: usize },

    #[error("{count} rows not in target language '{target}'")]
    Language { count: usize, target: String },
}

impl ValidationError {
    /// The check that raised this failure
    pub fn check(&self) -> Check {
        match self {
            ValidationError::Schema { .. } => Check::Schema,
            ValidationError::Nulls { .. } => Check::Nulls,
            ValidationError::Length { .. } => Check::Length,
            ValidationError::Language { .. } => Check::Language,
        }
    }

    /// Failure detail recorded in the report
    pub fn detail(&self) -> CheckDetail {
        match self {
            ValidationError::Schema { missing } => CheckDetail::Missing {
                missing_columns: missing.clone(),
            },
            ValidationError::Nulls { counts, .. } => CheckDetail::Counts(counts.clone()),
            ValidationError::Length {
                too_short,
                too_long,
            } => length_detail(*too_short, *too_long),
            ValidationError::Language { count, .. } => language_detail(*count),
        }
    }
}

/// The validation checks, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Schema,
    Nulls,
    Length,
    Language,
}

impl Check {
    pub fn name(&self) -> &'static str {
        match self {
            Check::Schema => "schema",
            Check::Nulls => "nulls",
            Check::Length => "length",
            Check::Language => "language",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result detail of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CheckDetail {
    Ok(&'static str),
    Missing { missing_columns: Vec<String> },
    Counts(BTreeMap<String, usize>),
}

fn length_detail(too_short: usize, too_long: usize) -> CheckDetail {
    CheckDetail::Counts(BTreeMap::from([
        ("too_short".to_string(), too_short),
        ("too_long".to_string(), too_long),
    ]))
}

fn language_detail(count: usize) -> CheckDetail {
    CheckDetail::Counts(BTreeMap::from([("invalid_language_count".to_string(), count)]))
}

/// Overall outcome of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

/// Report produced once per validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    row_count: usize,
    #[serde(serialize_with = "serialize_checks")]
    checks: Vec<(Check, CheckDetail)>,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    failure: Option<ValidationError>,
}

fn serialize_checks<S: Serializer>(
    checks: &[(Check, CheckDetail)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(checks.len()))?;
    for (check, detail) in checks {
        map.serialize_entry(check.name(), detail)?;
    }
    map.end()
}

impl ValidationReport {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }

    /// Error message of the failing check
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn failure(&self) -> Option<&ValidationError> {
        self.failure.as_ref()
    }

    /// Checks that ran, in execution order
    pub fn checks(&self) -> &[(Check, CheckDetail)] {
        &self.checks
    }

    pub fn detail(&self, check: Check) -> Option<&CheckDetail> {
        self.checks
            .iter()
            .find(|(c, _)| *c == check)
            .map(|(_, detail)| detail)
    }
}

/// Ensure the dataset's shape includes every required field
///
/// The shape is the union of keys across all object rows. An empty
/// dataset has no shape to contradict and passes.
pub fn validate_schema(rows: &[Value], required: &[&str]) -> std::result::Result<(), ValidationError> {
    if rows.is_empty() {
        return Ok(());
    }

    let columns: BTreeSet<&str> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|object| object.keys().map(String::as_str))
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|field| !columns.contains(*field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Schema { missing })
    }
}

fn is_null(row: &Value, field: &str) -> bool {
    match row.get(field) {
        None | Some(Value::Null) => true,
        // Text must be a string to be measured
        Some(value) if field == TEXT_FIELD => !value.is_string(),
        Some(_) => false,
    }
}

/// Count null or missing values per field, failing on the first field with any
pub fn validate_nulls(
    rows: &[Value],
    fields: &[&str],
) -> std::result::Result<BTreeMap<String, usize>, ValidationError> {
    let counts: BTreeMap<String, usize> = fields
        .iter()
        .map(|field| {
            let count = rows.iter().filter(|row| is_null(row, field)).count();
            (field.to_string(), count)
        })
        .collect();

    for field in fields {
        let count = counts[*field];
        if count > 0 {
            return Err(ValidationError::Nulls {
                field: field.to_string(),
                count,
                counts,
            });
        }
    }

    Ok(counts)
}

/// Texts outside the length bounds, as `(too_short, too_long)`
pub fn validate_text_length(
    rows: &[Value],
    min_len: usize,
    max_len: usize,
) -> std::result::Result<(usize, usize), ValidationError> {
    let bounds = LengthFilterConfig::new(min_len, max_len);
    let mut too_short = 0;
    let mut too_long = 0;

    for text in rows.iter().filter_map(|row| row.get(TEXT_FIELD)?.as_str()) {
        match bounds.verdict(text_length(text)) {
            LengthVerdict::TooShort => too_short += 1,
            LengthVerdict::TooLong => too_long += 1,
            LengthVerdict::InRange => {}
        }
    }

    if too_short > 0 || too_long > 0 {
        return Err(ValidationError::Length {
            too_short,
            too_long,
        });
    }

    Ok((too_short, too_long))
}

/// Rows whose language differs from `target`
///
/// Uses the row's `detected_lang` when present, otherwise classifies the text.
pub fn validate_language(
    rows: &[Value],
    target: &str,
    classifier: &LanguageClassifier,
) -> std::result::Result<usize, ValidationError> {
    let count = rows
        .iter()
        .filter(|row| {
            let lang = match row.get(LANG_FIELD).and_then(Value::as_str) {
                Some(lang) => lang.to_string(),
                None => classifier
                    .detect_language(row.get(TEXT_FIELD).and_then(Value::as_str).unwrap_or("")),
            };
            lang != target
        })
        .count();

    if count > 0 {
        return Err(ValidationError::Language {
            count,
            target: target.to_string(),
        });
    }

    Ok(count)
}

/// Runs the fixed battery of checks against a dataset
pub struct Validator<'a> {
    bounds: LengthFilterConfig,
    target_language: Option<String>,
    classifier: &'a LanguageClassifier,
}

impl<'a> Validator<'a> {
    pub fn new(config: &CleaningConfig, classifier: &'a LanguageClassifier) -> Self {
        Self {
            bounds: config.length_bounds(),
            target_language: config.target_language().map(str::to_string),
            classifier,
        }
    }

    fn run_check(
        &self,
        check: Check,
        rows: &[Value],
    ) -> std::result::Result<CheckDetail, ValidationError> {
        match check {
            Check::Schema => {
                validate_schema(rows, &REQUIRED_FIELDS).map(|_| CheckDetail::Ok("ok"))
            }
            Check::Nulls => validate_nulls(rows, &REQUIRED_FIELDS).map(CheckDetail::Counts),
            Check::Length => {
                validate_text_length(rows, self.bounds.min_length, self.bounds.max_length)
                    .map(|(too_short, too_long)| length_detail(too_short, too_long))
            }
            Check::Language => {
                let target = self.target_language.as_deref().unwrap_or_default();
                validate_language(rows, target, self.classifier).map(language_detail)
            }
        }
    }

    /// Checks applicable under this configuration, in order
    pub fn checks(&self) -> Vec<Check> {
        let mut checks = vec![Check::Schema, Check::Nulls, Check::Length];
        if self.target_language.is_some() {
            checks.push(Check::Language);
        }
        checks
    }

    /// Validate rows in memory, stopping at the first failing check
    pub fn validate(&self, rows: &[Value]) -> ValidationReport {
        let mut report = ValidationReport {
            row_count: rows.len(),
            checks: Vec::new(),
            status: Status::Pass,
            error: None,
            failure: None,
        };

        for check in self.checks() {
            match self.run_check(check, rows) {
                Ok(detail) => report.checks.push((check, detail)),
                Err(failure) => {
                    warn!("Validation check '{}' failed: {}", check, failure);
                    report.checks.push((check, failure.detail()));
                    report.status = Status::Fail;
                    report.error = Some(failure.to_string());
                    report.failure = Some(failure);
                    break;
                }
            }
        }

        report
    }

    /// Validate pipeline output
    pub fn validate_records(&self, records: &[EnrichedRecord]) -> ValidationReport {
        let rows: Vec<Value> = records.iter().map(EnrichedRecord::to_value).collect();
        self.validate(&rows)
    }
}

/// Validate, persist the report to `output_path`, then surface any failure
///
/// The report is written (replacing any earlier one) whether or not
/// validation passes.
pub fn run_validation(
    rows: &[Value],
    config: &CleaningConfig,
    classifier: &LanguageClassifier,
    output_path: &Path,
) -> Result<ValidationReport> {
    let report = Validator::new(config, classifier).validate(rows);
    persist(report, output_path)
}

/// [`run_validation`] over pipeline output
pub fn run_validation_records(
    records: &[EnrichedRecord],
    config: &CleaningConfig,
    classifier: &LanguageClassifier,
    output_path: &Path,
) -> Result<ValidationReport> {
    let report = Validator::new(config, classifier).validate_records(records);
    persist(report, output_path)
}

fn persist(report: ValidationReport, output_path: &Path) -> Result<ValidationReport> {
    write_json_pretty(output_path, &report)?;
    info!(
        "Validation {:?}: {} rows, report saved to {:?}",
        report.status(),
        report.row_count(),
        output_path
    );

    match report.failure() {
        Some(failure) => Err(Error::Validation(failure.clone())),
        None => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanset_filters::{DetectionError, LanguageDetector, PunctuationMode};
    use serde_json::json;
    use tempfile::TempDir;

    struct FixedDetector(&'static str);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> std::result::Result<String, DetectionError> {
            Ok(self.0.to_string())
        }
    }

    fn config(min_length: usize, max_length: usize, target: Option<&str>) -> CleaningConfig {
        CleaningConfig {
            min_length,
            max_length,
            target_language: target.map(str::to_string),
            punctuation: PunctuationMode::Capped,
            min_confidence: 0.0,
        }
    }

    fn clean_rows() -> Vec<Value> {
        vec![
            json!({"id": "1", "text": "saldo saya belum masuk", "text_length": 22, "detected_lang": "id"}),
            json!({"id": "2", "text": "tolong bantu cek transaksi", "text_length": 26, "detected_lang": "id"}),
        ]
    }

    #[test]
    fn test_all_checks_pass() {
        let classifier = LanguageClassifier::new(FixedDetector("id"));
        let report = Validator::new(&config(5, 100, Some("id")), &classifier).validate(&clean_rows());

        assert!(report.is_pass());
        assert_eq!(report.row_count(), 2);
        assert!(report.error().is_none());
        let names: Vec<&str> = report.checks().iter().map(|(c, _)| c.name()).collect();
        assert_eq!(names, vec!["schema", "nulls", "length", "language"]);
        assert_eq!(report.detail(Check::Schema), Some(&CheckDetail::Ok("ok")));
    }

    #[test]
    fn test_report_json_shape() {
        let classifier = LanguageClassifier::new(FixedDetector("id"));
        let report = Validator::new(&config(5, 100, Some("id")), &classifier).validate(&clean_rows());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "row_count": 2,
                "checks": {
                    "schema": "ok",
                    "nulls": {"id": 0, "text": 0},
                    "length": {"too_short": 0, "too_long": 0},
                    "language": {"invalid_language_count": 0}
                },
                "status": "PASS"
            })
        );
    }

    #[test]
    fn test_language_check_skipped_without_target() {
        let classifier = LanguageClassifier::new(FixedDetector("en"));
        let report = Validator::new(&config(5, 100, None), &classifier).validate(&clean_rows());

        assert!(report.is_pass());
        assert!(report.detail(Check::Language).is_none());
    }

    #[test]
    fn test_validate_text_length_reports_too_short() {
        let rows = vec![json!({"id": "1", "text": "hi"})];
        let err = validate_text_length(&rows, 20, 300).unwrap_err();

        assert_eq!(
            err,
            ValidationError::Length {
                too_short: 1,
                too_long: 0
            }
        );
        assert_eq!(err.to_string(), "Text length violation: 1 too short, 0 too long");
    }

    #[test]
    fn test_validate_text_length_counts_characters() {
        let rows = vec![json!({"id": "1", "text": "héllo"})];
        assert_eq!(validate_text_length(&rows, 5, 5).unwrap(), (0, 0));
    }

    #[test]
    fn test_validate_nulls() {
        let rows = vec![
            json!({"id": "1", "text": "ok"}),
            json!({"id": null, "text": "ok"}),
            json!({"id": "3", "text": null}),
            json!({"id": "4", "text": 12}),
        ];

        let err = validate_nulls(&rows, &REQUIRED_FIELDS).unwrap_err();
        match &err {
            ValidationError::Nulls {
                field,
                count,
                counts,
            } => {
                assert_eq!(field, "id");
                assert_eq!(*count, 1);
                assert_eq!(counts["text"], 2);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert_eq!(err.to_string(), "Column 'id' contains 1 null values");
    }

    #[test]
    fn test_validate_schema_union_of_fields() {
        let rows = vec![json!({"id": "1"}), json!({"text": "ok"})];
        assert!(validate_schema(&rows, &REQUIRED_FIELDS).is_ok());

        let rows = vec![json!({"text": "ok"})];
        let err = validate_schema(&rows, &REQUIRED_FIELDS).unwrap_err();
        assert_eq!(err.to_string(), "Missing required columns: id");

        assert!(validate_schema(&[], &REQUIRED_FIELDS).is_ok());
    }

    #[test]
    fn test_fail_fast_stops_after_first_failure() {
        let classifier = LanguageClassifier::new(FixedDetector("en"));
        let rows = vec![json!({"id": null, "text": "hi"})];
        let report = Validator::new(&config(20, 300, Some("id")), &classifier).validate(&rows);

        assert_eq!(report.status(), Status::Fail);
        assert_eq!(report.error(), Some("Column 'id' contains 1 null values"));
        assert!(report.detail(Check::Schema).is_some());
        assert!(report.detail(Check::Nulls).is_some());
        assert!(report.detail(Check::Length).is_none());
        assert!(report.detail(Check::Language).is_none());
        assert_eq!(report.failure().map(|f| f.check()), Some(Check::Nulls));
    }

    #[test]
    fn test_language_check_uses_detected_lang_then_classifier() {
        let classifier = LanguageClassifier::new(FixedDetector("en"));
        let rows = vec![
            json!({"id": "1", "text": "saldo saya belum masuk", "detected_lang": "id"}),
            json!({"id": "2", "text": "where is my refund", "detected_lang": null}),
            json!({"id": "3", "text": "kenapa gagal terus", "detected_lang": "ms"}),
        ];

        let err = validate_language(&rows, "id", &classifier).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Language {
                count: 2,
                target: "id".to_string()
            }
        );
        assert_eq!(err.to_string(), "2 rows not in target language 'id'");
    }

    #[test]
    fn test_run_validation_missing_id_persists_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed").join("validation_report.json");
        let classifier = LanguageClassifier::new(FixedDetector("id"));

        let rows = vec![json!({"text": "saldo saya belum masuk sejak kemarin"})];
        let result = run_validation(&rows, &config(20, 300, Some("id")), &classifier, &path);

        match result {
            Err(Error::Validation(ValidationError::Schema { missing })) => {
                assert_eq!(missing, vec!["id".to_string()]);
            }
            other => panic!("expected schema failure, got {other:?}"),
        }

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["status"], "FAIL");
        assert_eq!(saved["row_count"], 1);
        assert_eq!(saved["error"], "Missing required columns: id");
        assert_eq!(saved["checks"]["schema"], json!({"missing_columns": ["id"]}));
    }

    #[test]
    fn test_run_validation_records_pass_overwrites_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validation_report.json");
        std::fs::write(&path, "stale").unwrap();

        let classifier = LanguageClassifier::new(FixedDetector("id"));
        let records = vec![EnrichedRecord {
            id: "1".to_string(),
            text: "saldo saya belum masuk".to_string(),
            text_length: 22,
            detected_lang: Some("id".to_string()),
        }];

        let report =
            run_validation_records(&records, &config(5, 100, Some("id")), &classifier, &path)
                .unwrap();
        assert!(report.is_pass());

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["status"], "PASS");
        assert!(saved.get("error").is_none());
    }
}
