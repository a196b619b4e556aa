//! Recordings catalog backed by the worker's download directory.

use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::common::format_bytes;
use crate::domain::recording::{UNKNOWN_DURATION, UNKNOWN_STREAMER, is_recording_file};
use crate::domain::{Platform, Recording};
use crate::usecases::ports::RecordingCatalog;

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn files(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable download entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
    }

    fn describe(&self, entry: &DirEntry) -> Option<Recording> {
        let file_name = entry.file_name().to_str()?;
        if !is_recording_file(file_name) {
            return None;
        }
        let metadata = entry.metadata().ok()?;
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let folders: Vec<&str> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(name) => name.to_str(),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let streamer_name = folders.last().copied().unwrap_or(UNKNOWN_STREAMER);
        let platform = folders
            .iter()
            .map(|folder| Platform::from_label(folder))
            .find(|platform| *platform != Platform::Unknown)
            .unwrap_or(Platform::Unknown);

        Some(Recording {
            id: file_name.to_string(),
            streamer_name: streamer_name.to_string(),
            platform,
            start_time: start_time(&metadata),
            duration: UNKNOWN_DURATION.to_string(),
            size: format_bytes(metadata.len()),
            path: web_path(relative),
            risk_count: 0,
        })
    }
}

impl RecordingCatalog for DirectoryCatalog {
    fn list(&self) -> Vec<Recording> {
        if !self.root.is_dir() {
            return Vec::new();
        }
        let mut recordings: Vec<Recording> =
            self.files().filter_map(|entry| self.describe(&entry)).collect();
        recordings.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(a.id.cmp(&b.id)));
        recordings
    }

    fn storage_usage(&self) -> u64 {
        if !self.root.is_dir() {
            return 0;
        }
        self.files()
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }
}

fn start_time(metadata: &Metadata) -> String {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(|time| DateTime::<Local>::from(time).format(START_TIME_FORMAT).to_string())
        .unwrap_or_else(|_| UNKNOWN_DURATION.to_string())
}

/// Forward-slash path relative to the download root, as served under `/videos`.
fn web_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
