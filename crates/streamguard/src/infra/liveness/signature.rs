//! Process-table signature matching through sysinfo.

use std::ffi::OsStr;
use std::path::Path;

use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use crate::usecases::ports::ProcessIdentity;

/// Matches processes whose executable name starts with the interpreter stem
/// and whose command line mentions the worker directory.
#[derive(Debug, Clone)]
pub struct SignatureScanner {
    interpreter_stem: String,
    worker_dir: String,
}

impl SignatureScanner {
    pub fn new(interpreter: &str, worker_dir: &Path) -> Self {
        let interpreter_stem = Path::new(interpreter)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(interpreter)
            .to_lowercase();
        Self {
            interpreter_stem,
            worker_dir: worker_dir.to_string_lossy().into_owned(),
        }
    }

    /// Every matching PID except this process. Empty when enumeration fails.
    pub fn scan(&self) -> Vec<u32> {
        let mut system = System::new();
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind());
        let own = std::process::id();

        let mut pids: Vec<u32> = system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .filter(|(pid, _)| pid.as_u32() != own)
            .filter(|(_, process)| {
                command_line(process).is_some_and(|cmdline| {
                    self.matches(&process.name().to_string_lossy(), &cmdline)
                })
            })
            .map(|(pid, _)| pid.as_u32())
            .collect();
        pids.sort_unstable();
        debug!(count = pids.len(), "Signature scan finished");
        pids
    }

    pub fn identify(&self, pid: u32) -> ProcessIdentity {
        let sys_pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            refresh_kind(),
        );
        let Some(process) = system.process(sys_pid) else {
            return ProcessIdentity::Unknown;
        };
        match command_line(process) {
            Some(cmdline) if self.matches(&process.name().to_string_lossy(), &cmdline) => {
                ProcessIdentity::Match
            }
            Some(_) => ProcessIdentity::Mismatch,
            None => ProcessIdentity::Unknown,
        }
    }

    pub fn matches(&self, process_name: &str, cmdline: &str) -> bool {
        process_name
            .to_lowercase()
            .starts_with(&self.interpreter_stem)
            && cmdline.contains(&self.worker_dir)
    }
}

fn refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing()
        .with_cmd(UpdateKind::Always)
        .with_exe(UpdateKind::Always)
}

fn command_line(process: &Process) -> Option<String> {
    let cmd = process.cmd();
    if !cmd.is_empty() {
        let cmdline = cmd
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        return Some(cmdline);
    }
    process.exe().map(|path| path.to_string_lossy().into_owned())
}
