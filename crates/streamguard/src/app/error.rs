use thiserror::Error;

/// Exit codes following sysexits.h and the LSB status convention.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    /// LSB: program is not running (for `status`)
    pub const NOT_RUNNING: i32 = 3;
    pub const USAGE: i32 = 64;
    pub const IOERR: i32 = 74;
}

/// A failure already reported to the user, carrying the process exit code.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct CliError {
    pub exit_code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }
}
