use tokio::sync::mpsc;

use crate::models::download::{BackendProgress, DownloadTask};

/// Routes a running task's progress to an optional observer. Every value
/// delivered to the observer was first accepted by the task, so the observer
/// sees the same non-decreasing sequence the task records.
pub struct ProgressReporter {
    observer: Option<mpsc::Sender<f64>>,
}

impl ProgressReporter {
    pub fn new(observer: Option<mpsc::Sender<f64>>) -> Self {
        Self { observer }
    }

    pub async fn started(&self, task: &DownloadTask) {
        self.send(task.progress).await;
    }

    pub async fn advance(&self, task: &mut DownloadTask, fraction: f64) {
        if let Some(value) = task.advance(fraction) {
            self.send(value).await;
        }
    }

    pub async fn finished(&self, task: &mut DownloadTask, filename: &str) {
        if task.succeed(filename) {
            self.send(task.progress).await;
        }
    }

    async fn send(&self, value: f64) {
        if let Some(tx) = &self.observer {
            let _ = tx.send(value).await;
        }
    }

    /// Drains raw fractions from a strategy until its sender side is dropped.
    pub async fn pump_fractions(&self, task: &mut DownloadTask, mut rx: mpsc::Receiver<f64>) {
        while let Some(fraction) = rx.recv().await {
            self.advance(task, fraction).await;
        }
    }

    /// Same as [`pump_fractions`](Self::pump_fractions) for backend byte
    /// counters; events outside the downloading phase are ignored.
    pub async fn pump_backend(
        &self,
        task: &mut DownloadTask,
        mut rx: mpsc::Receiver<BackendProgress>,
    ) {
        while let Some(event) = rx.recv().await {
            if let Some(fraction) = event.fraction() {
                self.advance(task, fraction).await;
            }
        }
    }
}
