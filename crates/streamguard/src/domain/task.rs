use serde::Serialize;

use crate::domain::platform::Platform;
use crate::domain::worker::WorkerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Recording,
    Offline,
}

impl TaskStatus {
    pub fn from_running(running: bool) -> Self {
        if running {
            TaskStatus::Recording
        } else {
            TaskStatus::Offline
        }
    }
}

/// A parsed source entry as presented to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTask {
    /// Position of the line among the raw entry lines.
    pub id: String,
    pub url: String,
    pub name: String,
    pub quality: String,
    pub platform: Platform,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemOverview {
    pub worker: WorkerStatus,
    pub active_urls: usize,
    pub storage_bytes: u64,
}

pub struct AddSourceInput {
    pub url: String,
    pub name: Option<String>,
}
