use crate::domain::Recording;

/// Read-only view of the worker's output directory.
pub trait RecordingCatalog: Send + Sync {
    fn list(&self) -> Vec<Recording>;

    /// Total bytes of every file below the output directory.
    fn storage_usage(&self) -> u64;
}
