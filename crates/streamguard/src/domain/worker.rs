use serde::Serialize;

/// Lifecycle state of the supervised worker as seen by this supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkerState {
    Stopped,
    /// Spawned by this supervisor instance; a child handle is held.
    RunningOwned { pid: u32 },
    /// Found through the PID marker or a process signature; PID only.
    RunningDiscovered { pid: u32 },
    Stopping { pid: u32 },
}

impl WorkerState {
    pub fn pid(&self) -> Option<u32> {
        match self {
            WorkerState::Stopped => None,
            WorkerState::RunningOwned { pid }
            | WorkerState::RunningDiscovered { pid }
            | WorkerState::Stopping { pid } => Some(*pid),
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self, WorkerState::Stopped)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkerState::Stopped => "stopped",
            WorkerState::RunningOwned { .. } => "running_owned",
            WorkerState::RunningDiscovered { .. } => "running_discovered",
            WorkerState::Stopping { .. } => "stopping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub state: WorkerState,
}

impl From<WorkerState> for WorkerStatus {
    fn from(state: WorkerState) -> Self {
        Self {
            running: state.is_running(),
            pid: state.pid(),
            state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { pid: u32 },
    AlreadyRunning { pid: u32 },
}

impl StartOutcome {
    pub fn pid(&self) -> u32 {
        match self {
            StartOutcome::Started { pid } | StartOutcome::AlreadyRunning { pid } => *pid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    /// `forced` is set when the worker had to be killed after the grace period
    /// or was never owned by this supervisor.
    Stopped { pid: u32, forced: bool },
}

/// Result of the startup orphan sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub stale_registry_pid: Option<u32>,
    pub killed: Vec<u32>,
    pub failed: Vec<u32>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.killed.is_empty() && self.failed.is_empty()
    }
}

/// Outcome of a forceful signature sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillReport {
    pub killed: Vec<u32>,
    pub failed: Vec<KillFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillFailure {
    pub pid: u32,
    pub reason: String,
}

impl KillReport {
    pub fn merge(&mut self, other: KillReport) {
        self.killed.extend(other.killed);
        self.failed.extend(other.failed);
    }

    pub fn failed_pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.failed.iter().map(|failure| failure.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_has_no_pid() {
        let status = WorkerStatus::from(WorkerState::Stopped);
        assert!(!status.running);
        assert_eq!(status.pid, None);
    }

    #[test]
    fn stopping_still_reports_running() {
        let status = WorkerStatus::from(WorkerState::Stopping { pid: 42 });
        assert!(status.running);
        assert_eq!(status.pid, Some(42));
        assert_eq!(status.state.label(), "stopping");
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(WorkerState::RunningDiscovered { pid: 7 }).unwrap();
        assert_eq!(json["state"], "running_discovered");
        assert_eq!(json["pid"], 7);
    }

    #[test]
    fn kill_report_merge_keeps_order() {
        let mut report = KillReport {
            killed: vec![1],
            failed: vec![],
        };
        report.merge(KillReport {
            killed: vec![2],
            failed: vec![KillFailure {
                pid: 3,
                reason: "denied".to_string(),
            }],
        });
        assert_eq!(report.killed, vec![1, 2]);
        assert_eq!(report.failed_pids().collect::<Vec<_>>(), vec![3]);
    }
}
