//! In-memory process table shared by the mock probe, launcher and workers.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{KillFailure, KillReport};
use crate::usecases::ports::{
    ChildState, LaunchError, Liveness, LivenessProbe, ProcessIdentity, WorkerLauncher,
    WorkerProcess,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSignal {
    Term,
    Kill,
    SignatureKill,
}

#[derive(Default)]
struct TableState {
    liveness: HashMap<u32, Liveness>,
    signature: Vec<u32>,
    signals: Vec<(u32, MockSignal)>,
    kill_failures: HashSet<u32>,
    ignores_term: HashSet<u32>,
    foreign: HashSet<u32>,
}

#[derive(Clone, Default)]
pub struct MockProcessTable {
    state: Arc<Mutex<TableState>>,
}

impl MockProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(self, pid: u32, liveness: Liveness) -> Self {
        self.state.lock().unwrap().liveness.insert(pid, liveness);
        self
    }

    /// A live process that also matches the worker signature.
    pub fn with_signature_process(self, pid: u32) -> Self {
        self.add_signature_process(pid);
        self
    }

    pub fn add_signature_process(&self, pid: u32) {
        let mut state = self.state.lock().unwrap();
        state.liveness.insert(pid, Liveness::Alive);
        state.signature.push(pid);
    }

    /// A live process whose PID was reused by something other than the worker.
    pub fn with_foreign_process(self, pid: u32) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.liveness.insert(pid, Liveness::Alive);
            state.foreign.insert(pid);
        }
        self
    }

    pub fn with_kill_failure(self, pid: u32) -> Self {
        self.state.lock().unwrap().kill_failures.insert(pid);
        self
    }

    pub fn ignore_term(&self, pid: u32) {
        self.state.lock().unwrap().ignores_term.insert(pid);
    }

    pub fn spawn(&self, pid: u32) {
        self.state
            .lock()
            .unwrap()
            .liveness
            .insert(pid, Liveness::Alive);
    }

    /// Simulate the worker exiting on its own.
    pub fn exit(&self, pid: u32) {
        let mut state = self.state.lock().unwrap();
        state.liveness.insert(pid, Liveness::Dead);
        state.signature.retain(|p| *p != pid);
    }

    pub fn liveness(&self, pid: u32) -> Liveness {
        self.state
            .lock()
            .unwrap()
            .liveness
            .get(&pid)
            .copied()
            .unwrap_or(Liveness::Dead)
    }

    pub fn signals_sent(&self) -> Vec<(u32, MockSignal)> {
        self.state.lock().unwrap().signals.clone()
    }

    fn record(&self, pid: u32, signal: MockSignal) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.signals.push((pid, signal));
        if state.kill_failures.contains(&pid) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock kill denied",
            ));
        }
        if signal == MockSignal::Term && state.ignores_term.contains(&pid) {
            return Ok(());
        }
        if state.liveness.contains_key(&pid) {
            state.liveness.insert(pid, Liveness::Dead);
        }
        state.signature.retain(|p| *p != pid);
        Ok(())
    }
}

pub struct MockLivenessProbe {
    table: MockProcessTable,
}

impl MockLivenessProbe {
    pub fn new(table: MockProcessTable) -> Self {
        Self { table }
    }
}

impl LivenessProbe for MockLivenessProbe {
    fn probe(&self, pid: u32) -> Liveness {
        let state = self.table.state.lock().unwrap();
        state.liveness.get(&pid).copied().unwrap_or(Liveness::Dead)
    }

    fn identify(&self, pid: u32) -> ProcessIdentity {
        let state = self.table.state.lock().unwrap();
        if state.foreign.contains(&pid) {
            ProcessIdentity::Mismatch
        } else if state.signature.contains(&pid) {
            ProcessIdentity::Match
        } else {
            ProcessIdentity::Unknown
        }
    }

    fn find_by_signature(&self) -> Vec<u32> {
        self.table.state.lock().unwrap().signature.clone()
    }

    fn kill_by_signature(&self, pids: &[u32]) -> KillReport {
        let mut report = KillReport::default();
        for pid in pids {
            match self.table.record(*pid, MockSignal::SignatureKill) {
                Ok(()) => report.killed.push(*pid),
                Err(err) => report.failed.push(KillFailure {
                    pid: *pid,
                    reason: err.to_string(),
                }),
            }
        }
        report
    }
}

pub struct MockWorkerLauncher {
    table: MockProcessTable,
    next_pid: AtomicU32,
    launches: AtomicUsize,
    missing_script: bool,
    stubborn: bool,
}

impl MockWorkerLauncher {
    pub fn new(table: MockProcessTable) -> Self {
        Self {
            table,
            next_pid: AtomicU32::new(1000),
            launches: AtomicUsize::new(0),
            missing_script: false,
            stubborn: false,
        }
    }

    pub fn with_missing_script(mut self) -> Self {
        self.missing_script = true;
        self
    }

    /// Spawned workers ignore graceful termination.
    pub fn with_stubborn_workers(mut self) -> Self {
        self.stubborn = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl WorkerLauncher for MockWorkerLauncher {
    fn launch(&self) -> Result<Box<dyn WorkerProcess>, LaunchError> {
        if self.missing_script {
            return Err(LaunchError::ScriptMissing {
                path: PathBuf::from("missing/recorder.py"),
            });
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.table.spawn(pid);
        if self.stubborn {
            self.table.ignore_term(pid);
        }
        Ok(Box::new(MockWorker {
            pid,
            table: self.table.clone(),
        }))
    }
}

pub struct MockWorker {
    pid: u32,
    table: MockProcessTable,
}

impl WorkerProcess for MockWorker {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn poll(&mut self) -> ChildState {
        match self.table.liveness(self.pid) {
            Liveness::Alive => ChildState::Running,
            Liveness::Dead => ChildState::Exited(Some(0)),
            Liveness::Uncertain => ChildState::Unknown,
        }
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.table.record(self.pid, MockSignal::Term)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.table.record(self.pid, MockSignal::Kill)
    }
}
