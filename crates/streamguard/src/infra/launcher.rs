//! Spawns the recorder worker as a detached child process.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::infra::config::SupervisorConfig;
use crate::usecases::ports::{ChildState, LaunchError, WorkerLauncher, WorkerProcess};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

pub struct ScriptLauncher {
    interpreter: String,
    script: PathBuf,
    working_dir: PathBuf,
}

impl ScriptLauncher {
    pub fn new(config: &SupervisorConfig) -> Self {
        Self {
            interpreter: config.interpreter().to_string(),
            script: config.worker_script().to_path_buf(),
            working_dir: config.worker_dir(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.script)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);
        cmd
    }

    fn describe(&self) -> String {
        format!("{} {}", self.interpreter, self.script.display())
    }
}

impl WorkerLauncher for ScriptLauncher {
    fn launch(&self) -> Result<Box<dyn WorkerProcess>, LaunchError> {
        if !self.script.is_file() {
            return Err(LaunchError::ScriptMissing {
                path: self.script.clone(),
            });
        }
        let child = self
            .command()
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: self.describe(),
                source,
            })?;
        info!(pid = child.id(), command = %self.describe(), "Worker spawned");
        Ok(Box::new(ChildWorker { child }))
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;

    // SAFETY: setsid is async-signal-safe and only affects the forked child.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    cmd.creation_flags(CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP);
}

/// Worker handle backed by the spawned [`Child`].
pub struct ChildWorker {
    child: Child,
}

impl WorkerProcess for ChildWorker {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn poll(&mut self) -> ChildState {
        match self.child.try_wait() {
            Ok(Some(status)) => ChildState::Exited(status.code()),
            Ok(None) => ChildState::Running,
            Err(err) => {
                debug!(pid = self.child.id(), error = %err, "Failed to poll worker");
                ChildState::Unknown
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        signal_child(self.child.id(), libc::SIGTERM)
    }

    #[cfg(windows)]
    fn terminate(&mut self) -> io::Result<()> {
        // No console to deliver Ctrl-Break to; ask taskkill without /F first.
        let status = Command::new("taskkill")
            .args(["/PID", &self.child.id().to_string(), "/T"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("taskkill exited with {status}")))
        }
    }

    #[cfg(unix)]
    fn kill(&mut self) -> io::Result<()> {
        match signal_group(self.child.id(), libc::SIGKILL) {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(pid = self.child.id(), error = %err, "Group kill failed; killing child");
                self.child.kill()
            }
        }
    }

    #[cfg(windows)]
    fn kill(&mut self) -> io::Result<()> {
        let status = Command::new("taskkill")
            .args(["/PID", &self.child.id().to_string(), "/T", "/F"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            _ => self.child.kill(),
        }
    }
}

#[cfg(unix)]
fn pid_t(pid: u32) -> io::Result<libc::pid_t> {
    libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))
}

#[cfg(unix)]
fn signal_child(pid: u32, signal: libc::c_int) -> io::Result<()> {
    let pid = pid_t(pid)?;
    // SAFETY: the pid belongs to a child this process spawned and has not reaped.
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: libc::c_int) -> io::Result<()> {
    let pid = pid_t(pid)?;
    // SAFETY: the child called setsid, so its pid is also its process group id.
    if unsafe { libc::kill(-pid, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
