pub mod errors;
pub mod liveness;
pub mod pid_registry;
pub mod recording_catalog;
pub mod source_store;
pub mod worker_launcher;
#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{LaunchError, RegistryError, SourceStoreError};
pub use liveness::{Liveness, LivenessProbe, LivenessProbeHandle, ProcessIdentity};
pub use pid_registry::PidRegistry;
pub use recording_catalog::RecordingCatalog;
pub use source_store::{AppendOutcome, SourceStore};
pub use worker_launcher::{ChildState, WorkerLauncher, WorkerProcess};
