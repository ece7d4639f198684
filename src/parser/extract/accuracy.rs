use std::sync::LazyLock;

use regex::Regex;

use super::extract_scalar;

static VALIDATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Validation Accuracy:\s*([\d.]+)%").unwrap());
static COMPETITIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Competitive EvoTransformer:\s*([\d.]+)%").unwrap());
// "Original EvoTransformer (Baseline): 63.06%" and similar
static BASELINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Original.*?:\s*([\d.]+)%").unwrap());

pub fn validation(content: &str) -> Option<f64> {
    extract_scalar(content, &VALIDATION_RE)
}

pub fn competitive(content: &str) -> Option<f64> {
    extract_scalar(content, &COMPETITIVE_RE)
}

pub fn baseline(content: &str) -> Option<f64> {
    extract_scalar(content, &BASELINE_RE)
}
