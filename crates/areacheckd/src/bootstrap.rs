//! Service bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use areacheck_config::{Config, ConfigError, SocketPreparationError};

use crate::dispatch::ProtocolAdapter;
use crate::health::HealthReporter;
use crate::session::SessionStore;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when no configuration could be resolved.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out an already resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but describes an unusable value domain.
    #[error("invalid configuration: {source}")]
    InvalidConfiguration {
        /// First inconsistency found.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare gateway socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Service<S> {
    config: Config,
    adapter: ProtocolAdapter<S>,
    telemetry: TelemetryHandle,
}

impl<S> Service<S> {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Adapter wired to the configured value domain.
    #[must_use]
    pub fn adapter(&self) -> &ProtocolAdapter<S> {
        &self.adapter
    }

    /// Splits the service into its configuration and request adapter.
    #[must_use]
    pub fn into_parts(self) -> (Config, ProtocolAdapter<S>) {
        (self.config, self.adapter)
    }
}

/// Bootstraps the service using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration cannot be loaded or
/// validated, telemetry cannot be installed, or the socket directory cannot
/// be prepared. Every failure is also passed to `reporter`.
pub fn bootstrap_with<S>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    store: S,
) -> Result<Service<S>, BootstrapError>
where
    S: SessionStore,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => return Err(fail(&*reporter, BootstrapError::Configuration { source })),
    };

    if let Err(source) = config.validate() {
        return Err(fail(
            &*reporter,
            BootstrapError::InvalidConfiguration { source },
        ));
    }

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => return Err(fail(&*reporter, BootstrapError::Telemetry { source })),
    };

    if let Err(source) = config.gateway_socket().prepare_filesystem() {
        return Err(fail(&*reporter, BootstrapError::Socket { source }));
    }

    let adapter = ProtocolAdapter::new(&config, store);
    reporter.bootstrap_succeeded(&config);

    Ok(Service {
        config,
        adapter,
        telemetry,
    })
}

fn fail(reporter: &dyn HealthReporter, error: BootstrapError) -> BootstrapError {
    reporter.bootstrap_failed(&error);
    error
}
