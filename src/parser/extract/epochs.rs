use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::parse_finite;

use crate::record::EpochRow;

static EPOCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Epoch\s+(\d+):\s+([\d.]+)%").unwrap());

/// Every "Epoch N: X.XX%" phrase, in document order.
///
/// The phrase carries no best-checkpoint marker, so `is_best` is always false.
pub fn extract_epoch_series(content: &str) -> Vec<EpochRow> {
    EPOCH_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let epoch = caps[1].parse::<i64>().ok();
            let accuracy = parse_finite::<f64>(&caps[2]);
            match (epoch, accuracy) {
                (Some(epoch), Some(accuracy)) => Some(EpochRow {
                    epoch,
                    accuracy,
                    is_best: false,
                }),
                _ => {
                    debug!("Skipping malformed epoch line {:?}", &caps[0]);
                    None
                }
            }
        })
        .collect()
}
