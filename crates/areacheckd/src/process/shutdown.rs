use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

const SHUTDOWN_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Arranges for `requested` to become `true` once shutdown should start.
    fn install(&self, requested: &Arc<AtomicBool>) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install handler for signal {signal}: {source}")]
    Install {
        /// Signal number that could not be hooked.
        signal: i32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that reacts to termination signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn install(&self, requested: &Arc<AtomicBool>) -> Result<(), ShutdownError> {
        for signal in SHUTDOWN_SIGNALS {
            flag::register(signal, Arc::clone(requested))
                .map_err(|source| ShutdownError::Install { signal, source })?;
        }
        info!(
            target: PROCESS_TARGET,
            signals = ?SHUTDOWN_SIGNALS,
            "shutdown handlers installed"
        );
        Ok(())
    }
}
