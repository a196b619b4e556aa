use std::sync::Arc;

use crate::domain::{Recording, SystemOverview};
use crate::usecases::ProcessSupervisor;
use crate::usecases::ports::{RecordingCatalog, SourceStore};

pub trait OverviewUseCase: Send + Sync {
    fn execute(&self) -> SystemOverview;
}

pub struct OverviewUseCaseImpl {
    supervisor: Arc<ProcessSupervisor>,
    sources: Arc<dyn SourceStore>,
    recordings: Arc<dyn RecordingCatalog>,
}

impl OverviewUseCaseImpl {
    pub fn new(
        supervisor: Arc<ProcessSupervisor>,
        sources: Arc<dyn SourceStore>,
        recordings: Arc<dyn RecordingCatalog>,
    ) -> Self {
        Self {
            supervisor,
            sources,
            recordings,
        }
    }
}

impl OverviewUseCase for OverviewUseCaseImpl {
    fn execute(&self) -> SystemOverview {
        SystemOverview {
            worker: self.supervisor.status(),
            active_urls: self.sources.list_entries().len(),
            storage_bytes: self.recordings.storage_usage(),
        }
    }
}

pub trait ListRecordingsUseCase: Send + Sync {
    fn execute(&self) -> Vec<Recording>;
}

pub struct ListRecordingsUseCaseImpl {
    recordings: Arc<dyn RecordingCatalog>,
}

impl ListRecordingsUseCaseImpl {
    pub fn new(recordings: Arc<dyn RecordingCatalog>) -> Self {
        Self { recordings }
    }
}

impl ListRecordingsUseCase for ListRecordingsUseCaseImpl {
    fn execute(&self) -> Vec<Recording> {
        self.recordings.list()
    }
}
