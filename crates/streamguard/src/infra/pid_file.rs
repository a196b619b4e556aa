//! Marker-file registry holding the current worker PID.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::usecases::ports::{PidRegistry, RegistryError};

/// PID marker file: a decimal PID and a trailing newline, absent when no
/// worker is recorded.
pub struct FilePidRegistry {
    path: PathBuf,
}

impl FilePidRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> RegistryError {
        RegistryError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

impl PidRegistry for FilePidRegistry {
    fn write(&self, pid: u32) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory", e))?;
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, format!("{pid}\n")).map_err(|e| self.io_error("write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error("rename", e)
        })?;
        debug!(pid, path = %self.path.display(), "Recorded worker PID");
        Ok(())
    }

    fn read(&self) -> Result<Option<u32>, RegistryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error("read", err)),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse::<u32>() {
            Ok(0) | Err(_) => Err(RegistryError::Corrupt {
                path: self.path.clone(),
                content: trimmed.to_string(),
            }),
            Ok(pid) => Ok(Some(pid)),
        }
    }

    fn clear(&self) -> Result<(), RegistryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared worker PID record");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error("remove", err)),
        }
    }
}
