use crate::usecases::ports::SourceStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The url already occurs somewhere in the list; nothing was written.
    Duplicate,
}

pub trait SourceStore: Send + Sync {
    /// Raw, trimmed entry lines in file order. A missing list reads as empty.
    fn list_entries(&self) -> Vec<String>;

    fn append_entry(
        &self,
        url: &str,
        display_name: Option<&str>,
    ) -> Result<AppendOutcome, SourceStoreError>;
}
