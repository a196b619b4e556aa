use std::sync::Arc;

use crate::adapters::http::ApiState;
use crate::infra::{
    DirectoryCatalog, FilePidRegistry, FileSourceStore, ScriptLauncher, SupervisorConfig,
    platform_probe,
};
use crate::usecases::ports::{RecordingCatalog, SourceStore};
use crate::usecases::{
    AddSourceUseCaseImpl, ListRecordingsUseCaseImpl, ListTasksUseCaseImpl, OverviewUseCaseImpl,
    ProcessSupervisor,
};

/// Composition root: one supervisor plus the use cases built on top of it.
pub struct Container {
    config: SupervisorConfig,
    supervisor: Arc<ProcessSupervisor>,
    sources: Arc<dyn SourceStore>,
    recordings: Arc<dyn RecordingCatalog>,
}

impl Container {
    pub fn new(config: SupervisorConfig) -> Self {
        let supervisor = Arc::new(ProcessSupervisor::new(
            Arc::new(ScriptLauncher::new(&config)),
            platform_probe(&config),
            Arc::new(FilePidRegistry::new(config.pid_file())),
            config.supervisor_settings(),
        ));
        Self {
            sources: Arc::new(FileSourceStore::new(config.source_file())),
            recordings: Arc::new(DirectoryCatalog::new(config.download_dir())),
            supervisor,
            config,
        }
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    pub fn list_tasks(&self) -> ListTasksUseCaseImpl {
        ListTasksUseCaseImpl::new(Arc::clone(&self.sources), Arc::clone(&self.supervisor))
    }

    pub fn add_source(&self) -> AddSourceUseCaseImpl {
        AddSourceUseCaseImpl::new(Arc::clone(&self.sources))
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            supervisor: Arc::clone(&self.supervisor),
            overview: Arc::new(OverviewUseCaseImpl::new(
                Arc::clone(&self.supervisor),
                Arc::clone(&self.sources),
                Arc::clone(&self.recordings),
            )),
            list_tasks: Arc::new(self.list_tasks()),
            add_source: Arc::new(self.add_source()),
            recordings: Arc::new(ListRecordingsUseCaseImpl::new(Arc::clone(&self.recordings))),
            download_dir: self.config.download_dir().to_path_buf(),
        }
    }
}
