use std::io;

use crate::usecases::ports::LaunchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(Option<i32>),
    /// Polling the child failed.
    Unknown,
}

/// A worker spawned by this supervisor instance.
pub trait WorkerProcess: Send {
    fn pid(&self) -> u32;

    /// Non-blocking; reaps the child when it has exited.
    fn poll(&mut self) -> ChildState;

    /// Ask the worker to shut down gracefully.
    fn terminate(&mut self) -> io::Result<()>;

    /// Forcefully kill the worker and its process group.
    fn kill(&mut self) -> io::Result<()>;
}

pub trait WorkerLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn WorkerProcess>, LaunchError>;
}
