use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assemble::{assemble, assemble_architecture, assemble_results};
use crate::parser::extract::{extract_architecture_fields, extract_results, ExtractedFields};
use crate::parser::RawDocument;
use crate::record::{
    ArchitectureConfig, MetricsRecord, ResultsSection, ARCHITECTURE_SHAPE, RESULTS_SHAPE,
};

pub const RESULTS_FILE: &str = "RESULTS_COMPETITIVE.md";
pub const MODEL_FILE: &str = "model_competitive.py";

/// Project directory holding the results report and the model source.
#[derive(Debug, Clone)]
pub struct MetricsSource {
    root: PathBuf,
}

impl MetricsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn parse_results_file(&self) -> ResultsSection {
        assemble_results(&results_fields(RawDocument::read(&self.results_path()).as_ref()))
    }

    pub fn parse_model_file(&self) -> ArchitectureConfig {
        assemble_architecture(&architecture_fields(RawDocument::read(&self.model_path()).as_ref()))
    }

    pub fn get_all_metrics(&self) -> MetricsRecord {
        let results = RawDocument::read(&self.results_path());
        let model = RawDocument::read(&self.model_path());
        get_all_metrics_from(results.as_ref(), model.as_ref())
    }
}

/// Assemble a record from documents already in memory. `None` stands for a
/// document that does not exist.
pub fn get_all_metrics_from(
    results: Option<&RawDocument>,
    model: Option<&RawDocument>,
) -> MetricsRecord {
    assemble(&results_fields(results), &architecture_fields(model))
}

fn results_fields(doc: Option<&RawDocument>) -> ExtractedFields {
    doc.map(|d| {
        let fields = extract_results(d.content());
        report(d, &fields, RESULTS_SHAPE);
        fields
    })
    .unwrap_or_default()
}

fn architecture_fields(doc: Option<&RawDocument>) -> ExtractedFields {
    doc.map(|d| {
        let fields = extract_architecture_fields(d.content());
        report(d, &fields, ARCHITECTURE_SHAPE);
        fields
    })
    .unwrap_or_default()
}

fn report(doc: &RawDocument, fields: &ExtractedFields, shape: &[&str]) {
    if fields.is_empty() {
        warn!("No recognizable metrics in {}, using defaults", doc.source());
        return;
    }
    info!("Extracted {}/{} fields from {}", fields.len(), shape.len(), doc.source());
    let missing: Vec<&str> = shape.iter().copied().filter(|f| !fields.contains(f)).collect();
    if !missing.is_empty() {
        debug!("Defaults used for {:?}", missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::default_record;

    #[test]
    fn missing_root_gives_default_record() {
        let record = MetricsSource::new("tests/fixtures/no_such_project").get_all_metrics();
        assert!(record.same_content(&default_record()));
    }

    #[test]
    fn fixture_root() {
        let src = MetricsSource::new("tests/fixtures");
        let record = src.get_all_metrics();
        assert_eq!(record.results.accuracies.validation, 70.35);
        assert_eq!(record.results.accuracies.baseline, 63.06);
        assert_eq!(record.results.improvements.total, 7.29);
        assert_eq!(record.results.training_epochs.len(), 8);
        assert_eq!(record.results.model_comparisons.len(), 5);
        assert_eq!(record.architecture.num_layers, 2);
        assert_eq!(record.architecture.unfreeze_layers, 4);
        assert_eq!(record.results, src.parse_results_file());
        assert_eq!(record.architecture, src.parse_model_file());
    }

    #[test]
    fn extraction_is_idempotent() {
        let src = MetricsSource::new("tests/fixtures");
        let a = src.get_all_metrics();
        let b = src.get_all_metrics();
        assert!(a.same_content(&b));
        assert_eq!(
            serde_json::to_string(&(&a.results, &a.architecture)).unwrap(),
            serde_json::to_string(&(&b.results, &b.architecture)).unwrap()
        );
    }

    #[test]
    fn inline_documents() {
        let results = RawDocument::inline("Validation Accuracy: 70.35%\n+7.29% then +3.00%");
        let model = RawDocument::inline("num_heads = 16");
        let record = get_all_metrics_from(Some(&results), Some(&model));
        assert_eq!(record.results.accuracies.validation, 70.35);
        assert_eq!(record.results.improvements.total, 7.29);
        assert_eq!(record.architecture.num_heads, 16);
        assert_eq!(record.architecture.ffn_dim, 2048);
    }

    #[test]
    fn only_model_missing() {
        let results = RawDocument::inline("Epoch 1: 66.32%\nEpoch 2: 66.49%");
        let record = get_all_metrics_from(Some(&results), None);
        let epochs: Vec<(i64, f64)> = record
            .results
            .training_epochs
            .iter()
            .map(|e| (e.epoch, e.accuracy))
            .collect();
        assert_eq!(epochs, vec![(1, 66.32), (2, 66.49)]);
        assert_eq!(record.architecture, default_record().architecture);
    }

    #[test]
    fn serialized_shape() {
        let json = serde_json::to_value(MetricsSource::new("tests/fixtures").get_all_metrics()).unwrap();
        assert_eq!(json["results"]["accuracies"]["validation"], 70.35);
        assert_eq!(json["results"]["training_epochs"][0]["is_best"], false);
        assert_eq!(json["results"]["model_comparisons"][1]["model"], "Competitive EvoTransformer");
        assert_eq!(json["architecture"]["d_model"], 768);
        assert!(json["parsed_at"].is_string());
    }
}
