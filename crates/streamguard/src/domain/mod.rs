pub mod platform;
pub mod recording;
pub mod source_entry;
pub mod task;
pub mod worker;

pub use platform::Platform;
pub use recording::Recording;
pub use source_entry::{DEFAULT_DISPLAY_NAME, DEFAULT_QUALITY, SourceEntry, SourceParseError};
pub use task::{AddSourceInput, SourceTask, SystemOverview, TaskStatus};
pub use worker::{
    KillFailure, KillReport, ReconcileReport, StartOutcome, StopOutcome, WorkerState, WorkerStatus,
};
