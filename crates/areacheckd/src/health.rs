//! Structured health reporting for service lifecycle events.

use std::sync::Arc;

use areacheck_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::server::LoopSummary;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the gateway socket is bound and requests are accepted.
    fn gateway_listening(&self, endpoint: &SocketEndpoint);

    /// Invoked after the request loop has stopped.
    fn serving_stopped(&self, summary: &LoopSummary);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn gateway_listening(&self, endpoint: &SocketEndpoint) {
        (**self).gateway_listening(endpoint);
    }

    fn serving_stopped(&self, summary: &LoopSummary) {
        (**self).serving_stopped(summary);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting service bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        let (x_min, x_max) = config.x_bounds();
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.gateway_socket(),
            script_name = config.script_name(),
            x_min,
            x_max,
            allowed_y = %config.allowed_y(),
            allowed_r = %config.allowed_r(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "service bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "service bootstrap failed"
        );
    }

    fn gateway_listening(&self, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "gateway_listening",
            socket = %endpoint,
            "accepting gateway connections"
        );
    }

    fn serving_stopped(&self, summary: &LoopSummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "serving_stopped",
            served = summary.served,
            gateway_errors = summary.gateway_errors,
            "request loop stopped"
        );
    }
}
