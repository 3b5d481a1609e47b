//! Defines the unified error surface for service launch.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::gateway::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching the service process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the service failed.
    #[error("service bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Installing shutdown handlers failed.
    #[error("failed to install shutdown handlers: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// Binding the gateway socket failed.
    #[error("gateway socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}
