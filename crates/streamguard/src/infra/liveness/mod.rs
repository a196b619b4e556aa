//! Liveness probes, one per target platform family.

#[cfg(windows)]
mod process_table;
#[cfg(unix)]
mod signal;
mod signature;

use std::sync::Arc;

#[cfg(windows)]
pub use process_table::ProcessTableProbe;
#[cfg(unix)]
pub use signal::SignalLivenessProbe;
pub use signature::SignatureScanner;

use crate::infra::config::SupervisorConfig;
use crate::usecases::ports::LivenessProbeHandle;

/// Probe for the current target: process table on Windows, signals elsewhere.
pub fn platform_probe(config: &SupervisorConfig) -> LivenessProbeHandle {
    let scanner = SignatureScanner::new(config.interpreter(), &config.worker_dir());
    #[cfg(windows)]
    {
        if !config.signature_scan() {
            tracing::debug!("Signature scan is always enabled for the process-table probe");
        }
        Arc::new(ProcessTableProbe::new(scanner))
    }
    #[cfg(unix)]
    {
        Arc::new(SignalLivenessProbe::new(scanner, config.signature_scan()))
    }
}
