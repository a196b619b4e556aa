use std::sync::Arc;

use crate::domain::KillReport;

/// Answer of a single liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
    /// The check itself failed (permission, process table unavailable).
    Uncertain,
}

/// Whether a live PID still belongs to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessIdentity {
    Match,
    /// The PID was reused by an unrelated process.
    Mismatch,
    Unknown,
}

/// Ground-truth oracle for worker processes.
pub trait LivenessProbe: Send + Sync {
    fn probe(&self, pid: u32) -> Liveness;

    /// Fail-closed: an uncertain answer counts as not alive.
    fn is_alive(&self, pid: u32) -> bool {
        self.probe(pid) == Liveness::Alive
    }

    fn identify(&self, pid: u32) -> ProcessIdentity;

    /// PIDs of processes that look like the worker. Empty on any enumeration error.
    fn find_by_signature(&self) -> Vec<u32>;

    /// Forcefully kill each PID and its descendants. Attempts are independent.
    fn kill_by_signature(&self, pids: &[u32]) -> KillReport;
}

pub type LivenessProbeHandle = Arc<dyn LivenessProbe>;
