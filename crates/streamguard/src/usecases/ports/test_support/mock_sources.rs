use std::sync::Mutex;

use crate::domain::SourceEntry;
use crate::usecases::ports::{AppendOutcome, SourceStore, SourceStoreError};

#[derive(Default)]
pub struct MockSourceStore {
    lines: Mutex<Vec<String>>,
}

impl MockSourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(self, line: &str) -> Self {
        self.lines.lock().unwrap().push(line.to_string());
        self
    }
}

impl SourceStore for MockSourceStore {
    fn list_entries(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn append_entry(
        &self,
        url: &str,
        display_name: Option<&str>,
    ) -> Result<AppendOutcome, SourceStoreError> {
        if url.trim().is_empty() {
            return Err(SourceStoreError::EmptyUrl);
        }
        let mut lines = self.lines.lock().unwrap();
        if lines.iter().any(|line| line.contains(url)) {
            return Ok(AppendOutcome::Duplicate);
        }
        lines.push(SourceEntry::format_line(url, display_name));
        Ok(AppendOutcome::Appended)
    }
}
