//! Signal-based liveness for Unix targets.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{KillFailure, KillReport};
use crate::infra::liveness::SignatureScanner;
use crate::usecases::ports::{Liveness, LivenessProbe, ProcessIdentity};

const KILL_SETTLE_TIMEOUT: Duration = Duration::from_secs(1);
const KILL_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct SignalLivenessProbe {
    scanner: SignatureScanner,
    signature_scan: bool,
}

impl SignalLivenessProbe {
    pub fn new(scanner: SignatureScanner, signature_scan: bool) -> Self {
        Self {
            scanner,
            signature_scan,
        }
    }

    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let pid_t = to_pid_t(pid)?;
        // SAFETY: negative pid targets the process group created for the worker.
        let rc = unsafe { libc::kill(-pid_t, libc::SIGKILL) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
        // Not a group leader; fall back to the single process.
        // SAFETY: plain kill on a validated, positive pid.
        let rc = unsafe { libc::kill(pid_t, libc::SIGKILL) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Ok(()),
            _ => Err(err),
        }
    }

    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.probe(pid) == Liveness::Dead {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(KILL_POLL_INTERVAL);
        }
    }
}

impl LivenessProbe for SignalLivenessProbe {
    fn probe(&self, pid: u32) -> Liveness {
        let Ok(pid_t) = to_pid_t(pid) else {
            return Liveness::Dead;
        };
        reap_child_if_any(pid_t);
        // SAFETY: `kill` with signal 0 performs a permission check without sending any signal.
        let rc = unsafe { libc::kill(pid_t, 0) };
        if rc == 0 {
            return Liveness::Alive;
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Liveness::Dead,
            _ => {
                debug!(pid, error = %err, "Liveness check inconclusive");
                Liveness::Uncertain
            }
        }
    }

    fn identify(&self, pid: u32) -> ProcessIdentity {
        self.scanner.identify(pid)
    }

    fn find_by_signature(&self) -> Vec<u32> {
        if !self.signature_scan {
            return Vec::new();
        }
        self.scanner.scan()
    }

    fn kill_by_signature(&self, pids: &[u32]) -> KillReport {
        let mut report = KillReport::default();
        for &pid in pids {
            match self.kill_tree(pid) {
                Ok(()) => {
                    if !self.wait_for_exit(pid, KILL_SETTLE_TIMEOUT) {
                        debug!(pid, "Process still visible after SIGKILL");
                    }
                    report.killed.push(pid);
                }
                Err(err) => report.failed.push(KillFailure {
                    pid,
                    reason: err.to_string(),
                }),
            }
        }
        report
    }
}

fn to_pid_t(pid: u32) -> io::Result<libc::pid_t> {
    match libc::pid_t::try_from(pid) {
        Ok(pid_t) if pid_t > 0 => Ok(pid_t),
        _ => Err(io::Error::new(io::ErrorKind::InvalidInput, "PID out of range")),
    }
}

/// Collect the exit status of a terminated child so it stops showing up as a zombie.
fn reap_child_if_any(pid_t: libc::pid_t) {
    let mut status: libc::c_int = 0;
    loop {
        // SAFETY: waitpid is safe with a valid pid and status pointer.
        let rc = unsafe { libc::waitpid(pid_t, &mut status, libc::WNOHANG) };
        if rc == -1 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
            continue;
        }
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::CommandExt;
    use std::path::Path;
    use std::process::{Command, Stdio};

    fn probe() -> SignalLivenessProbe {
        SignalLivenessProbe::new(SignatureScanner::new("sh", Path::new("/nonexistent")), false)
    }

    fn spawn_group_leader() -> std::process::Child {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("sleep 30").stdin(Stdio::null());
        // SAFETY: setsid in the child only touches the child's session.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
        cmd.spawn().unwrap()
    }

    #[test]
    fn test_current_process_is_alive() {
        assert_eq!(probe().probe(std::process::id()), Liveness::Alive);
        assert!(probe().is_alive(std::process::id()));
    }

    #[test]
    fn test_out_of_range_pid_is_dead() {
        assert_eq!(probe().probe(0), Liveness::Dead);
        assert_eq!(probe().probe(u32::MAX), Liveness::Dead);
    }

    #[test]
    fn test_exited_child_is_reaped_and_dead() {
        let child = Command::new("sh").arg("-c").arg("exit 0").spawn().unwrap();
        let pid = child.id();
        let probe = probe();
        let deadline = Instant::now() + Duration::from_secs(5);
        while probe.probe(pid) != Liveness::Dead && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(probe.probe(pid), Liveness::Dead);
    }

    #[test]
    fn test_kill_by_signature_kills_process_group() {
        let child = spawn_group_leader();
        let pid = child.id();
        let probe = probe();
        assert!(probe.is_alive(pid));

        let report = probe.kill_by_signature(&[pid]);

        assert_eq!(report.killed, vec![pid]);
        assert!(report.failed.is_empty());
        assert!(!probe.is_alive(pid));
    }

    #[test]
    fn test_kill_of_missing_pid_counts_as_killed() {
        let child = Command::new("sh").arg("-c").arg("exit 0").spawn().unwrap();
        let pid = child.id();
        let probe = probe();
        let deadline = Instant::now() + Duration::from_secs(5);
        while probe.probe(pid) != Liveness::Dead && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }

        let report = probe.kill_by_signature(&[pid]);

        assert_eq!(report.killed, vec![pid]);
    }

    #[test]
    fn test_signature_scan_disabled_returns_nothing() {
        assert!(probe().find_by_signature().is_empty());
    }
}
