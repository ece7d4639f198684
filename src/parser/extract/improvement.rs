use std::sync::LazyLock;

use regex::Regex;

use super::extract_scalar;

static IMPROVEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+\s*([\d.]+)%").unwrap());

/// First "+X%" in the document. Reports lead with the headline gain, so later
/// deltas are ignored.
pub fn extract_improvement(content: &str) -> Option<f64> {
    extract_scalar(content, &IMPROVEMENT_RE)
}
