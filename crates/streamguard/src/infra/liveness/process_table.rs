//! Process-table liveness for Windows targets, via `tasklist` and `taskkill`.

use std::io;
use std::os::windows::process::CommandExt;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::domain::{KillFailure, KillReport};
use crate::infra::liveness::SignatureScanner;
use crate::usecases::ports::{Liveness, LivenessProbe, ProcessIdentity};

const CREATE_NO_WINDOW: u32 = 0x0800_0000;

pub struct ProcessTableProbe {
    scanner: SignatureScanner,
}

impl ProcessTableProbe {
    pub fn new(scanner: SignatureScanner) -> Self {
        Self { scanner }
    }

    fn run(program: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .creation_flags(CREATE_NO_WINDOW)
            .output()
    }

    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let pid_arg = pid.to_string();
        let output = Self::run("taskkill", &["/PID", &pid_arg, "/T", "/F"])?;
        if output.status.success() {
            return Ok(());
        }
        if self.probe(pid) == Liveness::Dead {
            return Ok(());
        }
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

impl LivenessProbe for ProcessTableProbe {
    fn probe(&self, pid: u32) -> Liveness {
        let filter = format!("PID eq {pid}");
        match Self::run("tasklist", &["/FI", &filter, "/NH", "/FO", "CSV"]) {
            Ok(output) if output.status.success() => {
                tasklist_contains(&String::from_utf8_lossy(&output.stdout), pid)
            }
            Ok(output) => {
                debug!(pid, status = ?output.status, "tasklist failed");
                Liveness::Uncertain
            }
            Err(err) => {
                debug!(pid, error = %err, "tasklist unavailable");
                Liveness::Uncertain
            }
        }
    }

    fn identify(&self, pid: u32) -> ProcessIdentity {
        self.scanner.identify(pid)
    }

    fn find_by_signature(&self) -> Vec<u32> {
        self.scanner.scan()
    }

    fn kill_by_signature(&self, pids: &[u32]) -> KillReport {
        let mut report = KillReport::default();
        for &pid in pids {
            match self.kill_tree(pid) {
                Ok(()) => report.killed.push(pid),
                Err(err) => report.failed.push(KillFailure {
                    pid,
                    reason: err.to_string(),
                }),
            }
        }
        report
    }
}

/// CSV rows quote every field, so `"<pid>"` only matches the PID column.
fn tasklist_contains(stdout: &str, pid: u32) -> Liveness {
    let needle = format!("\"{pid}\"");
    if stdout.lines().any(|line| line.contains(&needle)) {
        Liveness::Alive
    } else {
        Liveness::Dead
    }
}
