use std::sync::Arc;

use crate::domain::{AddSourceInput, Platform, SourceEntry, SourceTask, TaskStatus};
use crate::usecases::ProcessSupervisor;
use crate::usecases::ports::{AppendOutcome, SourceStore, SourceStoreError};

pub trait ListTasksUseCase: Send + Sync {
    fn execute(&self) -> Vec<SourceTask>;
}

pub struct ListTasksUseCaseImpl {
    sources: Arc<dyn SourceStore>,
    supervisor: Arc<ProcessSupervisor>,
}

impl ListTasksUseCaseImpl {
    pub fn new(sources: Arc<dyn SourceStore>, supervisor: Arc<ProcessSupervisor>) -> Self {
        Self {
            sources,
            supervisor,
        }
    }
}

impl ListTasksUseCase for ListTasksUseCaseImpl {
    fn execute(&self) -> Vec<SourceTask> {
        let status = TaskStatus::from_running(self.supervisor.status().running);
        build_tasks(&self.sources.list_entries(), status)
    }
}

/// Lines without a usable url are skipped but keep their index slot.
pub fn build_tasks(lines: &[String], status: TaskStatus) -> Vec<SourceTask> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let entry = line.parse::<SourceEntry>().ok()?;
            Some(SourceTask {
                id: idx.to_string(),
                platform: Platform::detect(entry.url()),
                url: entry.url().to_string(),
                name: entry.display_name().to_string(),
                quality: entry.quality().to_string(),
                status,
            })
        })
        .collect()
}

pub trait AddSourceUseCase: Send + Sync {
    fn execute(&self, input: AddSourceInput) -> Result<AppendOutcome, SourceStoreError>;
}

pub struct AddSourceUseCaseImpl {
    sources: Arc<dyn SourceStore>,
}

impl AddSourceUseCaseImpl {
    pub fn new(sources: Arc<dyn SourceStore>) -> Self {
        Self { sources }
    }
}

impl AddSourceUseCase for AddSourceUseCaseImpl {
    fn execute(&self, input: AddSourceInput) -> Result<AppendOutcome, SourceStoreError> {
        let url = input.url.trim();
        if url.is_empty() {
            return Err(SourceStoreError::EmptyUrl);
        }
        self.sources.append_entry(url, input.name.as_deref())
    }
}
