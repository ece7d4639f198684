use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ── Field names ──

pub const VALIDATION: &str = "accuracies.validation";
pub const COMPETITIVE: &str = "accuracies.competitive";
pub const BASELINE: &str = "accuracies.baseline";
pub const TRAINING_EPOCHS: &str = "training_epochs";
pub const MODEL_COMPARISONS: &str = "model_comparisons";
pub const IMPROVEMENT_TOTAL: &str = "improvements.total";

pub const NUM_LAYERS: &str = "num_layers";
pub const NUM_HEADS: &str = "num_heads";
pub const FFN_DIM: &str = "ffn_dim";
pub const D_MODEL: &str = "d_model";
pub const DROPOUT: &str = "dropout";
pub const UNFREEZE_LAYERS: &str = "unfreeze_layers";

/// Every field the results section is assembled from.
pub const RESULTS_SHAPE: &[&str] = &[
    VALIDATION,
    COMPETITIVE,
    BASELINE,
    TRAINING_EPOCHS,
    MODEL_COMPARISONS,
    IMPROVEMENT_TOTAL,
];

/// Every field the architecture section is assembled from.
pub const ARCHITECTURE_SHAPE: &[&str] = &[
    NUM_LAYERS,
    NUM_HEADS,
    FFN_DIM,
    D_MODEL,
    DROPOUT,
    UNFREEZE_LAYERS,
];

// ── Rows ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRow {
    pub epoch: i64,
    pub accuracy: f64,
    /// Always false when scraped: "Epoch N: X%" carries no best-checkpoint marker.
    pub is_best: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub model: String,
    pub accuracy: f64,
    /// Millions of parameters.
    pub parameters: f64,
    pub efficiency: f64,
}

impl ComparisonRow {
    pub fn new(model: impl Into<String>, accuracy: f64, parameters: f64) -> Self {
        Self {
            model: model.into(),
            accuracy,
            parameters,
            efficiency: efficiency(accuracy, parameters),
        }
    }
}

/// Accuracy per million parameters, 0 when there are no parameters or the
/// quotient overflows.
pub fn efficiency(accuracy: f64, parameters: f64) -> f64 {
    if parameters > 0.0 {
        Some(accuracy / parameters).filter(|e| e.is_finite()).unwrap_or(0.0)
    } else {
        0.0
    }
}

// ── Sections ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accuracies {
    pub validation: f64,
    pub competitive: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvements {
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSection {
    pub accuracies: Accuracies,
    pub training_epochs: Vec<EpochRow>,
    pub model_comparisons: Vec<ComparisonRow>,
    pub improvements: Improvements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub num_layers: i64,
    pub num_heads: i64,
    pub ffn_dim: i64,
    pub d_model: i64,
    pub dropout: f64,
    pub unfreeze_layers: i64,
}

/// Fully populated snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub results: ResultsSection,
    pub architecture: ArchitectureConfig,
    pub parsed_at: DateTime<Local>,
}

impl MetricsRecord {
    /// Compares everything except the `parsed_at` stamp.
    pub fn same_content(&self, other: &MetricsRecord) -> bool {
        self.results == other.results && self.architecture == other.architecture
    }
}
