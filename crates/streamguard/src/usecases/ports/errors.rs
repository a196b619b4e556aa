use std::path::PathBuf;

use thiserror::Error;

/// The only failure a supervisor operation reports to its caller.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Worker script not found: {}", path.display())]
    ScriptMissing { path: PathBuf },
    #[error("Failed to spawn worker `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    pub fn operation(&self) -> &'static str {
        match self {
            LaunchError::ScriptMissing { .. } => "locate script",
            LaunchError::Spawn { .. } => "spawn",
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("PID marker {operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PID marker {} holds unparseable content '{content}'", path.display())]
    Corrupt { path: PathBuf, content: String },
}

#[derive(Error, Debug)]
pub enum SourceStoreError {
    #[error("Source list {operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Source url must not be empty")]
    EmptyUrl,
}

impl SourceStoreError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SourceStoreError::EmptyUrl)
    }
}
