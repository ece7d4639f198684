use std::sync::LazyLock;

use regex::Regex;

use super::{extract_scalar, ExtractedFields};
use crate::record::{DROPOUT, D_MODEL, FFN_DIM, NUM_HEADS, NUM_LAYERS, UNFREEZE_LAYERS};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Int,
    Float,
}

struct Rule {
    field: &'static str,
    kind: Kind,
    pattern: Regex,
}

// `name = 2`, `name: 2`, `'name': 2`, `"name" = 2`
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (NUM_LAYERS, Kind::Int),
        (NUM_HEADS, Kind::Int),
        (FFN_DIM, Kind::Int),
        (D_MODEL, Kind::Int),
        (DROPOUT, Kind::Float),
        (UNFREEZE_LAYERS, Kind::Int),
    ]
    .into_iter()
    .map(|(field, kind)| {
        let value = match kind {
            Kind::Int => r"(\d+)",
            Kind::Float => r"([\d.]+)",
        };
        let pattern = Regex::new(&format!(r#"{}['"]?\s*[:=]\s*{}"#, field, value)).unwrap();
        Rule { field, kind, pattern }
    })
    .collect()
});

/// Hyperparameter assignments found in model source code. First assignment
/// of each name wins.
pub fn extract_architecture_fields(source_code: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::default();
    for rule in RULES.iter() {
        match rule.kind {
            Kind::Int => fields.set(rule.field, extract_scalar::<i64>(source_code, &rule.pattern)),
            Kind::Float => fields.set(rule.field, extract_scalar::<f64>(source_code, &rule.pattern)),
        }
    }
    fields
}
