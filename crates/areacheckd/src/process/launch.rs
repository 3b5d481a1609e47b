//! Supervises service launch sequencing and runtime orchestration.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::gateway::FastCgiGateway;
use crate::health::HealthReporter;
use crate::server::{LoopSummary, RequestLoop};
use crate::session::InMemorySessionStore;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the service.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the service using the production collaborators.
///
/// Blocks until a termination signal arrives.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap, signal installation or socket
/// binding fails.
pub fn run_server() -> Result<LoopSummary, LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal,
    };
    run_server_with(plan)
}

/// Runs the service with injected collaborators.
pub(crate) fn run_server_with<L, S>(plan: LaunchPlan<L, S>) -> Result<LoopSummary, LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
    } = plan;

    let service = bootstrap_with(&loader, Arc::clone(&reporter), InMemorySessionStore::new())?;
    let (config, adapter) = service.into_parts();

    let requested = Arc::new(AtomicBool::new(false));
    shutdown.install(&requested)?;

    let gateway = FastCgiGateway::bind(config.gateway_socket(), requested)?;
    info!(
        target: PROCESS_TARGET,
        socket = %gateway.endpoint(),
        script_name = config.script_name(),
        "serving requests"
    );
    reporter.gateway_listening(gateway.endpoint());

    let mut request_loop = RequestLoop::new(gateway, adapter);
    let summary = request_loop.run();
    drop(request_loop);

    reporter.serving_stopped(&summary);
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(summary)
}
