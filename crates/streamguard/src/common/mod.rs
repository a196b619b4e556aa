//! Helpers shared by every layer of the supervisor.

pub mod byte_size;
pub mod sync;
pub mod telemetry;

pub use byte_size::format_bytes;
