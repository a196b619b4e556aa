//! File-backed source list shared with the recorder.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::SourceEntry;
use crate::domain::source_entry::is_skippable_line;
use crate::usecases::ports::{AppendOutcome, SourceStore, SourceStoreError};

const UTF8_BOM: char = '\u{feff}';

pub struct FileSourceStore {
    path: PathBuf,
}

impl FileSourceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_content(&self) -> io::Result<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                Ok(Some(text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> SourceStoreError {
        SourceStoreError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

impl SourceStore for FileSourceStore {
    fn list_entries(&self) -> Vec<String> {
        let content = match self.read_content() {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read source list");
                return Vec::new();
            }
        };
        content
            .lines()
            .filter(|line| !is_skippable_line(line))
            .map(|line| line.trim().to_string())
            .collect()
    }

    fn append_entry(
        &self,
        url: &str,
        display_name: Option<&str>,
    ) -> Result<AppendOutcome, SourceStoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SourceStoreError::EmptyUrl);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory", e))?;
        }

        let existing = self
            .read_content()
            .map_err(|e| self.io_error("read", e))?
            .unwrap_or_default();
        // Substring match mirrors the recorder's own duplicate check.
        if existing.contains(url) {
            debug!(url, "Source already listed");
            return Ok(AppendOutcome::Duplicate);
        }

        let line = SourceEntry::format_line(url, display_name);
        let needs_separator = !existing.is_empty() && !existing.ends_with('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;
        let payload = if needs_separator {
            format!("\n{line}")
        } else {
            line
        };
        file.write_all(payload.as_bytes())
            .map_err(|e| self.io_error("append", e))?;

        info!(url, path = %self.path.display(), "Source added");
        Ok(AppendOutcome::Appended)
    }
}
