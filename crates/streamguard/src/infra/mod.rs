//! Adapters from the supervisor's ports to the operating system.

pub mod config;
pub mod launcher;
pub mod liveness;
pub mod pid_file;
pub mod recordings;
#[cfg(unix)]
pub mod signal_handler;
pub mod source_file;

pub use config::SupervisorConfig;
pub use launcher::ScriptLauncher;
pub use liveness::platform_probe;
pub use pid_file::FilePidRegistry;
pub use recordings::DirectoryCatalog;
pub use source_file::FileSourceStore;
