use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::media::MediaKind;

/// Ceiling for in-flight progress. Only a successful finish reaches 1.0.
pub const MAX_IN_FLIGHT_PROGRESS: f64 = 0.999;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadStatus::Succeeded | DownloadStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub id: Uuid,
    pub url: String,
    pub kind: MediaKind,
    pub output_dir: PathBuf,
    pub filename: Option<String>,
    pub progress: f64,
    pub status: DownloadStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, kind: MediaKind, output_dir: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            kind,
            output_dir: output_dir.into(),
            filename: None,
            progress: 0.0,
            status: DownloadStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.status != DownloadStatus::Pending {
            tracing::warn!("[task {}] start ignored in state {:?}", self.id, self.status);
            return false;
        }
        self.status = DownloadStatus::InProgress;
        self.touch();
        true
    }

    /// Records a progress observation. Returns the stored value when it moved the
    /// task forward, `None` when it was dropped (regression, non-finite, wrong state).
    pub fn advance(&mut self, fraction: f64) -> Option<f64> {
        if self.status != DownloadStatus::InProgress || !fraction.is_finite() {
            return None;
        }
        let value = fraction.clamp(0.0, MAX_IN_FLIGHT_PROGRESS);
        if value <= self.progress {
            return None;
        }
        self.progress = value;
        self.touch();
        Some(value)
    }

    pub fn succeed(&mut self, filename: impl Into<String>) -> bool {
        if self.status != DownloadStatus::InProgress {
            return false;
        }
        self.filename = Some(filename.into());
        self.progress = 1.0;
        self.status = DownloadStatus::Succeeded;
        self.touch();
        true
    }

    /// Marks the task failed. Progress stays at its last observed value.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.error = Some(message.into());
        self.status = DownloadStatus::Failed;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadPhase {
    Downloading,
    Finished,
    PostProcessing,
    Other,
}

/// Byte counters reported by a video backend while it transfers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BackendProgress {
    pub phase: DownloadPhase,
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
}

impl BackendProgress {
    pub fn downloading(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            phase: DownloadPhase::Downloading,
            downloaded_bytes,
            total_bytes,
        }
    }

    /// Fraction complete, only while actively downloading with a known total.
    pub fn fraction(&self) -> Option<f64> {
        if self.phase != DownloadPhase::Downloading {
            return None;
        }
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.downloaded_bytes as f64 / total as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_task() -> DownloadTask {
        let mut task = DownloadTask::new("https://example.com/a.png", MediaKind::Image, "/tmp");
        assert!(task.start());
        task
    }

    #[test]
    fn new_task_is_pending_at_zero() {
        let task = DownloadTask::new("https://example.com/a.png", MediaKind::Image, "/tmp");
        assert_eq!(task.status, DownloadStatus::Pending);
        assert_eq!(task.progress, 0.0);
        assert!(task.error.is_none());
    }

    #[test]
    fn advance_requires_in_progress() {
        let mut task = DownloadTask::new("u", MediaKind::Image, "/tmp");
        assert_eq!(task.advance(0.5), None);
        assert_eq!(task.progress, 0.0);
    }

    #[test]
    fn advance_drops_regressions() {
        let mut task = running_task();
        assert_eq!(task.advance(0.4), Some(0.4));
        assert_eq!(task.advance(0.2), None);
        assert_eq!(task.advance(0.4), None);
        assert_eq!(task.progress, 0.4);
    }

    #[test]
    fn advance_never_reaches_one() {
        let mut task = running_task();
        assert_eq!(task.advance(1.0), Some(MAX_IN_FLIGHT_PROGRESS));
        assert_eq!(task.advance(3.0), None);
        assert!(task.progress < 1.0);
    }

    #[test]
    fn advance_ignores_nan() {
        let mut task = running_task();
        assert_eq!(task.advance(f64::NAN), None);
    }

    #[test]
    fn succeed_sets_full_progress() {
        let mut task = running_task();
        task.advance(0.3);
        assert!(task.succeed("a.png"));
        assert_eq!(task.progress, 1.0);
        assert_eq!(task.status, DownloadStatus::Succeeded);
        assert_eq!(task.filename.as_deref(), Some("a.png"));
    }

    #[test]
    fn fail_keeps_last_progress() {
        let mut task = running_task();
        task.advance(0.6);
        assert!(task.fail("boom"));
        assert_eq!(task.progress, 0.6);
        assert_eq!(task.error.as_deref(), Some("boom"));
    }

    #[test]
    fn terminal_state_is_final() {
        let mut task = running_task();
        assert!(task.succeed("a.png"));
        assert!(!task.fail("late"));
        assert!(!task.start());
        assert_eq!(task.status, DownloadStatus::Succeeded);
        assert!(task.error.is_none());
    }

    #[test]
    fn fraction_only_while_downloading() {
        assert_eq!(BackendProgress::downloading(50, Some(200)).fraction(), Some(0.25));
        assert_eq!(BackendProgress::downloading(50, None).fraction(), None);
        assert_eq!(BackendProgress::downloading(50, Some(0)).fraction(), None);

        let merging = BackendProgress {
            phase: DownloadPhase::PostProcessing,
            downloaded_bytes: 10,
            total_bytes: Some(10),
        };
        assert_eq!(merging.fraction(), None);
    }
}
