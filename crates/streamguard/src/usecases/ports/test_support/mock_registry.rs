use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::usecases::ports::{PidRegistry, RegistryError};

pub struct MockPidRegistry {
    pid: Mutex<Option<u32>>,
    writes: Mutex<Vec<u32>>,
    clears: Mutex<usize>,
    fail_writes: bool,
    fail_reads: bool,
}

impl Default for MockPidRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPidRegistry {
    pub fn new() -> Self {
        Self {
            pid: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            clears: Mutex::new(0),
            fail_writes: false,
            fail_reads: false,
        }
    }

    pub fn with_pid(self, pid: u32) -> Self {
        *self.pid.lock().unwrap() = Some(pid);
        self
    }

    pub fn with_write_failure(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_read_failure(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn current(&self) -> Option<u32> {
        *self.pid.lock().unwrap()
    }

    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }

    fn failure(operation: &'static str) -> RegistryError {
        RegistryError::Io {
            operation,
            path: PathBuf::from("mock.pid"),
            source: io::Error::other("mock registry failure"),
        }
    }
}

impl PidRegistry for MockPidRegistry {
    fn write(&self, pid: u32) -> Result<(), RegistryError> {
        if self.fail_writes {
            return Err(Self::failure("write"));
        }
        self.writes.lock().unwrap().push(pid);
        *self.pid.lock().unwrap() = Some(pid);
        Ok(())
    }

    fn read(&self) -> Result<Option<u32>, RegistryError> {
        if self.fail_reads {
            return Err(Self::failure("read"));
        }
        Ok(*self.pid.lock().unwrap())
    }

    fn clear(&self) -> Result<(), RegistryError> {
        *self.clears.lock().unwrap() += 1;
        *self.pid.lock().unwrap() = None;
        Ok(())
    }
}
