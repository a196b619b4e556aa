//! Worker lifecycle state machine.
//!
//! The in-memory slot is the supervisor's belief, the PID registry is the
//! belief that survives restarts, and the liveness probe is ground truth.
//! `reconcile`, `start` and `stop` are serialized by the slot mutex; `status`
//! never waits on it and reports the last published state while another
//! operation is in flight.

use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::common::sync::{
    mutex_lock_or_recover, mutex_try_lock_or_recover, rwlock_read_or_recover,
    rwlock_write_or_recover,
};
use crate::domain::{
    KillReport, ReconcileReport, StartOutcome, StopOutcome, WorkerState, WorkerStatus,
};
use crate::usecases::ports::{
    ChildState, LaunchError, LivenessProbeHandle, PidRegistry, ProcessIdentity, WorkerLauncher,
    WorkerProcess,
};

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_KILL_WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct SupervisorSettings {
    grace_period: Duration,
    poll_interval: Duration,
    kill_wait: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            poll_interval: DEFAULT_POLL_INTERVAL,
            kill_wait: DEFAULT_KILL_WAIT,
        }
    }
}

impl SupervisorSettings {
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_kill_wait(mut self, kill_wait: Duration) -> Self {
        self.kill_wait = kill_wait;
        self
    }
}

enum Slot {
    Empty,
    Owned(Box<dyn WorkerProcess>),
    Discovered(u32),
}

/// Whether a stale registry record may be removed while reading it.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StaleRecord {
    Clear,
    Keep,
}

pub struct ProcessSupervisor {
    launcher: Arc<dyn WorkerLauncher>,
    probe: LivenessProbeHandle,
    registry: Arc<dyn PidRegistry>,
    settings: SupervisorSettings,
    slot: Mutex<Slot>,
    published: RwLock<WorkerState>,
}

impl ProcessSupervisor {
    pub fn new(
        launcher: Arc<dyn WorkerLauncher>,
        probe: LivenessProbeHandle,
        registry: Arc<dyn PidRegistry>,
        settings: SupervisorSettings,
    ) -> Self {
        Self {
            launcher,
            probe,
            registry,
            settings,
            slot: Mutex::new(Slot::Empty),
            published: RwLock::new(WorkerState::Stopped),
        }
    }

    /// Startup sweep: forget dead records and kill every surviving worker so the
    /// next `start` spawns exactly one fresh process.
    pub fn reconcile(&self) -> ReconcileReport {
        let mut slot = mutex_lock_or_recover(&self.slot);
        let mut report = ReconcileReport::default();
        let mut targets = Vec::new();

        if let Some(pid) = self.read_registry() {
            if !self.probe.is_alive(pid) {
                info!(pid, "Clearing PID record of dead worker");
                report.stale_registry_pid = Some(pid);
                self.clear_registry();
            } else if self.probe.identify(pid) == ProcessIdentity::Mismatch {
                warn!(
                    pid,
                    "Recorded PID now belongs to another process; clearing without terminating"
                );
                report.stale_registry_pid = Some(pid);
                self.clear_registry();
            } else {
                targets.push(pid);
            }
        }

        for pid in self.discover() {
            if !targets.contains(&pid) {
                targets.push(pid);
            }
        }

        if !targets.is_empty() {
            info!(pids = ?targets, "Killing orphaned workers from a previous run");
            let kill = self.probe.kill_by_signature(&targets);
            log_kill_failures(&kill);
            report.failed = kill.failed_pids().collect();
            report.killed = kill.killed;
        }

        self.clear_registry();
        *slot = Slot::Empty;
        self.publish(WorkerState::Stopped);
        report
    }

    pub fn start(&self) -> Result<StartOutcome, LaunchError> {
        let mut slot = mutex_lock_or_recover(&self.slot);

        match &mut *slot {
            Slot::Owned(child) => {
                let pid = child.pid();
                if self.owned_is_running(child.as_mut()) {
                    debug!(pid, "Worker already running");
                    return Ok(StartOutcome::AlreadyRunning { pid });
                }
                info!(pid, "Owned worker has exited; starting a new one");
                *slot = Slot::Empty;
                self.clear_registry();
            }
            Slot::Discovered(pid) => {
                let pid = *pid;
                if self.probe.is_alive(pid) {
                    return Ok(StartOutcome::AlreadyRunning { pid });
                }
                info!(pid, "Discovered worker is gone");
                *slot = Slot::Empty;
                self.clear_registry();
            }
            Slot::Empty => {}
        }

        let adopted = self
            .registry_pid(StaleRecord::Clear)
            .or_else(|| self.discover().into_iter().next());
        if let Some(pid) = adopted {
            info!(pid, "Adopting running worker instead of spawning");
            self.write_registry(pid);
            *slot = Slot::Discovered(pid);
            self.publish(WorkerState::RunningDiscovered { pid });
            return Ok(StartOutcome::AlreadyRunning { pid });
        }

        let child = self.launcher.launch()?;
        let pid = child.pid();
        self.write_registry(pid);
        *slot = Slot::Owned(child);
        self.publish(WorkerState::RunningOwned { pid });
        info!(pid, "Worker started");
        Ok(StartOutcome::Started { pid })
    }

    /// Always leaves the supervisor in `Stopped`, escalating to a forceful kill
    /// once the grace period is exhausted.
    pub fn stop(&self) -> StopOutcome {
        let mut slot = mutex_lock_or_recover(&self.slot);
        let current = std::mem::replace(&mut *slot, Slot::Empty);

        let outcome = match current {
            Slot::Owned(mut child) => {
                let pid = child.pid();
                self.publish(WorkerState::Stopping { pid });
                let forced = self.stop_owned(child.as_mut());
                if forced {
                    self.sweep(Vec::new(), pid);
                }
                StopOutcome::Stopped { pid, forced }
            }
            Slot::Discovered(pid) => {
                self.publish(WorkerState::Stopping { pid });
                self.sweep(vec![pid], pid);
                StopOutcome::Stopped { pid, forced: true }
            }
            Slot::Empty => {
                let mut targets: Vec<u32> =
                    self.registry_pid(StaleRecord::Clear).into_iter().collect();
                for pid in self.discover() {
                    if !targets.contains(&pid) {
                        targets.push(pid);
                    }
                }
                match targets.first().copied() {
                    Some(pid) => {
                        self.publish(WorkerState::Stopping { pid });
                        self.sweep(targets, pid);
                        StopOutcome::Stopped { pid, forced: true }
                    }
                    None => StopOutcome::NotRunning,
                }
            }
        };

        self.clear_registry();
        self.publish(WorkerState::Stopped);
        if let StopOutcome::Stopped { pid, forced } = outcome {
            info!(pid, forced, "Worker stopped");
        }
        outcome
    }

    /// Read-only view: owned handle first, then the registry, then signature
    /// discovery. Never writes the registry.
    pub fn status(&self) -> WorkerStatus {
        let Some(mut slot) = mutex_try_lock_or_recover(&self.slot) else {
            return WorkerStatus::from(self.published_state());
        };

        let state = match &mut *slot {
            Slot::Owned(child) => {
                let pid = child.pid();
                self.owned_is_running(child.as_mut())
                    .then_some(WorkerState::RunningOwned { pid })
            }
            Slot::Discovered(pid) => {
                let pid = *pid;
                self.probe
                    .is_alive(pid)
                    .then_some(WorkerState::RunningDiscovered { pid })
            }
            Slot::Empty => None,
        };

        let state = state
            .or_else(|| {
                self.registry_pid(StaleRecord::Keep)
                    .map(|pid| WorkerState::RunningDiscovered { pid })
            })
            .or_else(|| {
                self.discover()
                    .into_iter()
                    .next()
                    .map(|pid| WorkerState::RunningDiscovered { pid })
            })
            .unwrap_or(WorkerState::Stopped);

        self.publish(state);
        WorkerStatus::from(state)
    }

    fn stop_owned(&self, child: &mut dyn WorkerProcess) -> bool {
        let pid = child.pid();
        if matches!(child.poll(), ChildState::Exited(_)) {
            debug!(pid, "Worker already exited before stop");
            return false;
        }

        if let Err(err) = child.terminate() {
            warn!(pid, error = %err, "Failed to request graceful worker shutdown");
        }
        if self.wait_for_exit(child, self.settings.grace_period) {
            return false;
        }

        warn!(
            pid,
            grace_period = ?self.settings.grace_period,
            "Worker did not exit within grace period; killing"
        );
        if let Err(err) = child.kill() {
            warn!(pid, error = %err, "Failed to kill worker");
        }
        if !self.wait_for_exit(child, self.settings.kill_wait) {
            warn!(pid, "Worker still present after kill");
        }
        true
    }

    fn wait_for_exit(&self, child: &mut dyn WorkerProcess, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let exited = match child.poll() {
                ChildState::Exited(_) => true,
                ChildState::Running => false,
                ChildState::Unknown => !self.probe.is_alive(child.pid()),
            };
            if exited {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(self.settings.poll_interval);
        }
    }

    fn owned_is_running(&self, child: &mut dyn WorkerProcess) -> bool {
        match child.poll() {
            ChildState::Running => true,
            ChildState::Exited(code) => {
                debug!(pid = child.pid(), ?code, "Owned worker exited");
                false
            }
            ChildState::Unknown => self.probe.is_alive(child.pid()),
        }
    }

    /// Kill `targets` and every current signature match. Failures are logged only.
    fn sweep(&self, mut targets: Vec<u32>, primary: u32) {
        for pid in self.discover() {
            if !targets.contains(&pid) {
                targets.push(pid);
            }
        }
        if targets.is_empty() {
            return;
        }
        debug!(primary, pids = ?targets, "Forceful worker sweep");
        let report = self.probe.kill_by_signature(&targets);
        log_kill_failures(&report);
    }

    fn discover(&self) -> Vec<u32> {
        let own = std::process::id();
        self.probe
            .find_by_signature()
            .into_iter()
            .filter(|pid| *pid != own)
            .collect()
    }

    fn registry_pid(&self, stale: StaleRecord) -> Option<u32> {
        let pid = self.read_registry()?;
        if !self.probe.is_alive(pid) {
            if stale == StaleRecord::Clear {
                debug!(pid, "Clearing PID record of dead worker");
                self.clear_registry();
            }
            return None;
        }
        if self.probe.identify(pid) == ProcessIdentity::Mismatch {
            if stale == StaleRecord::Clear {
                warn!(pid, "Recorded PID belongs to another process; ignoring it");
                self.clear_registry();
            }
            return None;
        }
        Some(pid)
    }

    fn read_registry(&self) -> Option<u32> {
        match self.registry.read() {
            Ok(pid) => pid,
            Err(err) => {
                warn!(error = %err, "PID registry unreadable; falling back to discovery");
                None
            }
        }
    }

    fn write_registry(&self, pid: u32) {
        if let Err(err) = self.registry.write(pid) {
            warn!(pid, error = %err, "Failed to record worker PID");
        }
    }

    fn clear_registry(&self) {
        if let Err(err) = self.registry.clear() {
            warn!(error = %err, "Failed to clear worker PID record");
        }
    }

    fn publish(&self, state: WorkerState) {
        *rwlock_write_or_recover(&self.published) = state;
    }

    fn published_state(&self) -> WorkerState {
        *rwlock_read_or_recover(&self.published)
    }
}

fn log_kill_failures(report: &KillReport) {
    for failure in &report.failed {
        warn!(pid = failure.pid, reason = %failure.reason, "Failed to kill worker process");
    }
}
