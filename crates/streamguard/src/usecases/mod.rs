mod overview;
mod sources;
mod supervisor;

pub use overview::{
    ListRecordingsUseCase, ListRecordingsUseCaseImpl, OverviewUseCase, OverviewUseCaseImpl,
};
pub use sources::{
    AddSourceUseCase, AddSourceUseCaseImpl, ListTasksUseCase, ListTasksUseCaseImpl, build_tasks,
};
pub use supervisor::{DEFAULT_GRACE_PERIOD, ProcessSupervisor, SupervisorSettings};
pub mod ports;
