pub mod accuracy;
pub mod architecture;
pub mod comparison;
pub mod epochs;
pub mod improvement;

use std::collections::BTreeMap;
use std::str::FromStr;

use regex::Regex;
use tracing::debug;

use crate::record::{
    ComparisonRow, EpochRow, BASELINE, COMPETITIVE, IMPROVEMENT_TOTAL, MODEL_COMPARISONS,
    TRAINING_EPOCHS, VALIDATION,
};

pub use architecture::extract_architecture_fields;
pub use comparison::extract_comparison_table;
pub use epochs::extract_epoch_series;
pub use improvement::extract_improvement;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Epochs(Vec<EpochRow>),
    Comparisons(Vec<ComparisonRow>),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<Vec<EpochRow>> for FieldValue {
    fn from(v: Vec<EpochRow>) -> Self {
        FieldValue::Epochs(v)
    }
}

impl From<Vec<ComparisonRow>> for FieldValue {
    fn from(v: Vec<ComparisonRow>) -> Self {
        FieldValue::Comparisons(v)
    }
}

/// Fields produced by the rules that matched. A name is absent when its rule
/// found nothing usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl ExtractedFields {
    pub fn set<V: Into<FieldValue>>(&mut self, name: &'static str, value: Option<V>) {
        match value {
            Some(v) => {
                self.fields.insert(name, v.into());
            }
            None => debug!("{} not found", name),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

/// Values a capture may convert into. Floats overflowing to infinity (or NaN)
/// do not count as converted.
pub trait Finite {
    fn is_finite(&self) -> bool;
}

impl Finite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Finite for i64 {
    fn is_finite(&self) -> bool {
        true
    }
}

impl Finite for String {
    fn is_finite(&self) -> bool {
        true
    }
}

/// Parse `raw` as `T`, rejecting non-finite results.
pub fn parse_finite<T: FromStr + Finite>(raw: &str) -> Option<T> {
    raw.parse::<T>().ok().filter(|v| Finite::is_finite(v))
}

/// First match of `pattern`, first capture group, parsed as `T`.
pub fn extract_scalar<T: FromStr + Finite>(content: &str, pattern: &Regex) -> Option<T> {
    let caps = pattern.captures(content)?;
    let raw = caps.get(1)?.as_str().trim();
    match parse_finite::<T>(raw) {
        Some(v) => Some(v),
        None => {
            debug!("Unparseable capture {:?} for /{}/", raw, pattern.as_str());
            None
        }
    }
}

/// Run every results rule against a markdown report.
pub fn extract_results(content: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    fields.set(VALIDATION, accuracy::validation(content));
    fields.set(COMPETITIVE, accuracy::competitive(content));
    fields.set(BASELINE, accuracy::baseline(content));

    // An empty series is indistinguishable from no series
    let epochs = extract_epoch_series(content);
    fields.set(TRAINING_EPOCHS, Some(epochs).filter(|e| !e.is_empty()));
    let rows = extract_comparison_table(content);
    fields.set(MODEL_COMPARISONS, Some(rows).filter(|r| !r.is_empty()));

    fields.set(IMPROVEMENT_TOTAL, extract_improvement(content));
    fields
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DROPOUT, D_MODEL, NUM_LAYERS};

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    #[test]
    fn scalar_first_match_only() {
        let re = Regex::new(r"Loss:\s*([\d.]+)").unwrap();
        assert_eq!(extract_scalar::<f64>("Loss: 0.51 Loss: 0.49", &re), Some(0.51));
    }

    #[test]
    fn scalar_conversion_failure_is_absent() {
        let re = Regex::new(r"Epochs:\s*([\d.]+)").unwrap();
        assert_eq!(extract_scalar::<i64>("Epochs: 8.5", &re), None);
        assert_eq!(extract_scalar::<f64>("Epochs: 1.2.3", &re), None);
    }

    #[test]
    fn scalar_overflow_is_absent() {
        let re = Regex::new(r"Accuracy:\s*([\d.]+)%").unwrap();
        let huge = format!("Accuracy: 1{}%", "0".repeat(400));
        assert_eq!(extract_scalar::<f64>(&huge, &re), None);
        assert_eq!(extract_scalar::<i64>(&huge, &re), None);
    }

    #[test]
    fn overflowing_report_keeps_defaults_and_reloads() {
        let digits = "0".repeat(400);
        let report = format!(
            "Validation Accuracy: 1{d}%\nEpoch 1: 1{d}%\nEpoch 2: 66.49%\n| Big | 1{d}% | 40.6M |\n| Tiny | 70.35% | 0.{d}1M |",
            d = digits
        );
        let fields = extract_results(&report);
        assert!(!fields.contains(VALIDATION));
        match fields.get(TRAINING_EPOCHS) {
            Some(FieldValue::Epochs(rows)) => assert_eq!(rows.len(), 1),
            other => panic!("unexpected epochs field: {:?}", other),
        }
        match fields.get(MODEL_COMPARISONS) {
            Some(FieldValue::Comparisons(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].model, "Tiny");
                assert_eq!(rows[0].efficiency, 0.0);
            }
            other => panic!("unexpected comparisons field: {:?}", other),
        }

        let section = crate::assemble::assemble_results(&fields);
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["accuracies"]["validation"], 70.35);
        let back: crate::record::ResultsSection = serde_json::from_value(json).unwrap();
        assert_eq!(back, section);
    }

    #[test]
    fn scalar_no_match_is_absent() {
        let re = Regex::new(r"Epochs:\s*(\d+)").unwrap();
        assert_eq!(extract_scalar::<i64>("nothing here", &re), None);
    }

    #[test]
    fn scalar_string_conversion() {
        let re = Regex::new(r"GPU:\s*(.+)").unwrap();
        assert_eq!(extract_scalar::<String>("GPU: Tesla T4", &re).as_deref(), Some("Tesla T4"));
    }

    #[test]
    fn results_fixture_all_fields() {
        let fields = extract_results(&fixture("RESULTS_COMPETITIVE.md"));
        assert_eq!(fields.get(VALIDATION), Some(&FieldValue::Float(70.35)));
        assert_eq!(fields.get(COMPETITIVE), Some(&FieldValue::Float(70.35)));
        assert_eq!(fields.get(BASELINE), Some(&FieldValue::Float(63.06)));
        assert_eq!(fields.get(IMPROVEMENT_TOTAL), Some(&FieldValue::Float(7.29)));

        match fields.get(TRAINING_EPOCHS) {
            Some(FieldValue::Epochs(rows)) => {
                assert_eq!(rows.len(), 8);
                assert_eq!(rows[0].epoch, 1);
                assert_eq!(rows[4].accuracy, 70.35);
            }
            other => panic!("unexpected epochs field: {:?}", other),
        }
        match fields.get(MODEL_COMPARISONS) {
            Some(FieldValue::Comparisons(rows)) => {
                assert_eq!(rows.len(), 5);
                assert!(rows.iter().all(|r| !r.model.contains("Model")));
            }
            other => panic!("unexpected comparisons field: {:?}", other),
        }
    }

    #[test]
    fn results_empty_document() {
        assert!(extract_results("").is_empty());
    }

    #[test]
    fn results_partial_document() {
        let fields = extract_results("Validation Accuracy: 68.39%\nEpoch 3: 68.39%");
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(VALIDATION));
        assert!(fields.contains(TRAINING_EPOCHS));
        assert!(!fields.contains(MODEL_COMPARISONS));
    }

    #[test]
    fn architecture_fixture() {
        let fields = extract_architecture_fields(&fixture("model_competitive.py"));
        assert_eq!(fields.get(NUM_LAYERS), Some(&FieldValue::Int(2)));
        assert_eq!(fields.get(D_MODEL), Some(&FieldValue::Int(768)));
        assert_eq!(fields.get(DROPOUT), Some(&FieldValue::Float(0.1)));
        assert_eq!(fields.len(), 6);
    }
}
