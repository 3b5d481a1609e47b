//! BDD test world: encapsulates loader, reporter, and bootstrap state for step functions.

use std::cell::RefCell;
use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Service, bootstrap_with};
use crate::session::InMemorySessionStore;

use super::config_loader::{FailingConfigLoader, InconsistentConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across bootstrap steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    service: Option<Service<InMemorySessionStore>>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            service: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader whose value domain is inconsistent.
    pub fn use_inconsistent_loader(&mut self) {
        self.loader = Box::new(InconsistentConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.service.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        match bootstrap_with(
            &*self.loader,
            self.reporter.clone(),
            InMemorySessionStore::new(),
        ) {
            Ok(service) => self.service = Some(service),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bootstrapped service, if any.
    #[must_use]
    pub fn service(&self) -> Option<&Service<InMemorySessionStore>> {
        self.service.as_ref()
    }

    fn reset_results(&mut self) {
        self.service = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture constructor used by the behaviour suites.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
