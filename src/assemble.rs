use chrono::Local;

use crate::defaults::{architecture_default, results_default};
use crate::parser::extract::{ExtractedFields, FieldValue};
use crate::record::*;

/// Resolves each field of one section against extracted values and a default
/// table. A field the table does not cover, or a value of the wrong kind, is
/// a mismatch between the record shape and the defaults and aborts assembly.
struct Section<'a> {
    name: &'static str,
    shape: &'static [&'static str],
    fields: &'a ExtractedFields,
    defaults: fn(&str) -> Option<FieldValue>,
}

impl<'a> Section<'a> {
    fn new(
        name: &'static str,
        shape: &'static [&'static str],
        fields: &'a ExtractedFields,
        defaults: fn(&str) -> Option<FieldValue>,
    ) -> Self {
        for (field, _) in fields.iter() {
            if !shape.contains(&field) {
                panic!("{}: extracted field {:?} is not part of the record shape", name, field);
            }
        }
        Self { name, shape, fields, defaults }
    }

    fn value(&self, field: &str) -> FieldValue {
        debug_assert!(self.shape.iter().any(|f| *f == field), "{} not in {} shape", field, self.name);
        let default = (self.defaults)(field)
            .unwrap_or_else(|| panic!("{}: no default for field {:?}", self.name, field));
        match self.fields.get(field) {
            Some(v) if std::mem::discriminant(v) == std::mem::discriminant(&default) => v.clone(),
            Some(v) => panic!(
                "{}: field {:?} extracted as {:?}, default is {:?}",
                self.name, field, v, default
            ),
            None => default,
        }
    }

    fn float(&self, field: &str) -> f64 {
        match self.value(field) {
            FieldValue::Float(v) => v,
            other => panic!("{}: field {:?} is not a float: {:?}", self.name, field, other),
        }
    }

    fn int(&self, field: &str) -> i64 {
        match self.value(field) {
            FieldValue::Int(v) => v,
            other => panic!("{}: field {:?} is not an integer: {:?}", self.name, field, other),
        }
    }

    fn epochs(&self, field: &str) -> Vec<EpochRow> {
        match self.value(field) {
            FieldValue::Epochs(v) => v,
            other => panic!("{}: field {:?} is not an epoch series: {:?}", self.name, field, other),
        }
    }

    fn comparisons(&self, field: &str) -> Vec<ComparisonRow> {
        match self.value(field) {
            FieldValue::Comparisons(v) => v,
            other => panic!("{}: field {:?} is not a comparison table: {:?}", self.name, field, other),
        }
    }
}

pub fn assemble_results(fields: &ExtractedFields) -> ResultsSection {
    let s = Section::new("results", RESULTS_SHAPE, fields, results_default);
    ResultsSection {
        accuracies: Accuracies {
            validation: s.float(VALIDATION),
            competitive: s.float(COMPETITIVE),
            baseline: s.float(BASELINE),
        },
        training_epochs: s.epochs(TRAINING_EPOCHS),
        model_comparisons: s.comparisons(MODEL_COMPARISONS),
        improvements: Improvements {
            total: s.float(IMPROVEMENT_TOTAL),
        },
    }
}

pub fn assemble_architecture(fields: &ExtractedFields) -> ArchitectureConfig {
    let s = Section::new("architecture", ARCHITECTURE_SHAPE, fields, architecture_default);
    ArchitectureConfig {
        num_layers: s.int(NUM_LAYERS),
        num_heads: s.int(NUM_HEADS),
        ffn_dim: s.int(FFN_DIM),
        d_model: s.int(D_MODEL),
        dropout: s.float(DROPOUT),
        unfreeze_layers: s.int(UNFREEZE_LAYERS),
    }
}

/// Build a complete record, stamped with the current local time.
pub fn assemble(results: &ExtractedFields, architecture: &ExtractedFields) -> MetricsRecord {
    MetricsRecord {
        results: assemble_results(results),
        architecture: assemble_architecture(architecture),
        parsed_at: Local::now(),
    }
}

/// The record produced when no document yields anything.
#[cfg(test)]
pub fn default_record() -> MetricsRecord {
    assemble(&ExtractedFields::default(), &ExtractedFields::default())
}
