use crate::usecases::ports::RegistryError;

/// Durable record of the worker PID, surviving supervisor restarts.
pub trait PidRegistry: Send + Sync {
    fn write(&self, pid: u32) -> Result<(), RegistryError>;

    fn read(&self) -> Result<Option<u32>, RegistryError>;

    fn clear(&self) -> Result<(), RegistryError>;
}
