//! Test double for [`HealthReporter`] that records structured events for assertions.
//!
//! The recorder captures the lifecycle telemetry emitted during bootstrap and
//! serving so behaviour tests can validate observable events.

use std::sync::Mutex;

use areacheck_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::server::LoopSummary;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The gateway socket was bound.
    GatewayListening(String),
    /// The request loop stopped.
    ServingStopped(LoopSummary),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Returns true once the gateway has reported it is listening.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.events()
            .iter()
            .any(|event| matches!(event, HealthEvent::GatewayListening(_)))
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn gateway_listening(&self, endpoint: &SocketEndpoint) {
        self.record(HealthEvent::GatewayListening(endpoint.to_string()));
    }

    fn serving_stopped(&self, summary: &LoopSummary) {
        self.record(HealthEvent::ServingStopped(*summary));
    }
}
