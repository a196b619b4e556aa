mod mock_process;
mod mock_registry;
mod mock_sources;

pub use mock_process::{MockLivenessProbe, MockProcessTable, MockSignal, MockWorkerLauncher};
pub use mock_registry::MockPidRegistry;
pub use mock_sources::MockSourceStore;
