use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::parse_finite;

use crate::record::ComparisonRow;

// | name | 70.35% | 40.6M
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\s*([^|]+)\s*\|\s*([\d.]+)%?\s*\|\s*([\d.]+)M?").unwrap()
});

const HEADER_KEYWORDS: &[&str] = &["Model", "Acc"];

/// Rows of pipe tables shaped `| name | accuracy% | parameters M |`.
pub fn extract_comparison_table(content: &str) -> Vec<ComparisonRow> {
    content
        .lines()
        .filter(|line| line.contains('|'))
        .flat_map(|line| ROW_RE.captures_iter(line))
        .filter_map(|caps| {
            let model = caps[1].trim();
            if is_header(model) {
                return None;
            }
            let accuracy = parse_finite::<f64>(&caps[2]);
            let parameters = parse_finite::<f64>(&caps[3]);
            match (accuracy, parameters) {
                (Some(accuracy), Some(parameters)) => {
                    Some(ComparisonRow::new(model, accuracy, parameters))
                }
                _ => {
                    debug!("Skipping malformed table row {:?}", &caps[0]);
                    None
                }
            }
        })
        .collect()
}

fn is_header(name: &str) -> bool {
    HEADER_KEYWORDS.iter().any(|k| name.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
| Model | Accuracy | Parameters |
|-------|----------|------------|
| Competitive EvoTransformer | 70.35% | 40.6M |
| Original EvoTransformer | 63.06% | 11.3M |
";

    #[test]
    fn header_and_separator_excluded() {
        let rows = extract_comparison_table(TABLE);
        let names: Vec<&str> = rows.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(names, vec!["Competitive EvoTransformer", "Original EvoTransformer"]);
    }

    #[test]
    fn literal_header_row_alone_yields_nothing() {
        assert!(extract_comparison_table("| Model | Accuracy | Parameters |").is_empty());
    }

    #[test]
    fn numeric_header_row_is_dropped() {
        assert!(extract_comparison_table("| Model size | 1.0 | 2.0 |").is_empty());
        assert!(extract_comparison_table("| Acc@1 | 70.0 | 2.0 |").is_empty());
    }

    #[test]
    fn efficiency_derived() {
        let rows = extract_comparison_table(TABLE);
        assert_eq!(rows[0].accuracy, 70.35);
        assert_eq!(rows[0].parameters, 40.6);
        assert!((rows[0].efficiency - 1.732).abs() < 1e-3);
    }

    #[test]
    fn zero_parameters_zero_efficiency() {
        let rows = extract_comparison_table("| Lookup Table | 50.00% | 0M |");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].efficiency, 0.0);
    }

    #[test]
    fn suffixes_optional() {
        let rows = extract_comparison_table("| Frozen BERT Baseline | 53.43 | 16.8 |");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].parameters, 16.8);
    }

    #[test]
    fn unparseable_cells_skipped() {
        assert!(extract_comparison_table("| Broken | 1.2.3% | 4M |").is_empty());
    }

    #[test]
    fn rows_do_not_span_lines() {
        assert!(extract_comparison_table("| Name\n| 70.35% | 40.6M |").is_empty());
    }
}
