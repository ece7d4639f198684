use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dashboard::timestamp;

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(5);
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingUpdate {
    pub timestamp: String,
    pub status: String,
    pub message: String,
}

impl TrainingUpdate {
    pub fn idle() -> Self {
        Self {
            timestamp: timestamp(),
            status: "idle".to_string(),
            message: "Model training completed. System ready for inference.".to_string(),
        }
    }
}

/// Start a timer task that sends one update per `interval`. The task stops
/// once the receiver is dropped.
pub fn spawn_updates(interval: Duration) -> (JoinHandle<()>, mpsc::Receiver<TrainingUpdate>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; updates start one interval in
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if tx.send(TrainingUpdate::idle()).await.is_err() {
                debug!("Update receiver closed, stopping emitter");
                break;
            }
        }
    });

    (handle, rx)
}
