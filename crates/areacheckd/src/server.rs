//! Sequential request loop connecting a gateway to the protocol adapter.

use tracing::{debug, warn};

use crate::dispatch::ProtocolAdapter;
use crate::gateway::Gateway;
use crate::session::SessionStore;

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Counters reported once the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Responses delivered, rejections included.
    pub served: u64,
    /// Accept or respond failures reported by the gateway.
    pub gateway_errors: u64,
}

/// Serves one request at a time until the gateway reports no more requests.
#[derive(Debug)]
pub struct RequestLoop<G, S> {
    gateway: G,
    adapter: ProtocolAdapter<S>,
}

impl<G, S> RequestLoop<G, S>
where
    G: Gateway,
    S: SessionStore,
{
    /// Pairs a gateway with the adapter that answers its requests.
    #[must_use]
    pub fn new(gateway: G, adapter: ProtocolAdapter<S>) -> Self {
        Self { gateway, adapter }
    }

    /// Runs until [`Gateway::accept`] returns `Ok(None)`.
    ///
    /// Gateway failures are logged and counted; they never stop the loop.
    pub fn run(&mut self) -> LoopSummary {
        let mut summary = LoopSummary::default();
        loop {
            let request = match self.gateway.accept() {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(error) => {
                    summary.gateway_errors += 1;
                    warn!(target: SERVER_TARGET, %error, "failed to accept request");
                    continue;
                }
            };

            let response = self.adapter.handle(&request);
            match self.gateway.respond(&response.encode()) {
                Ok(()) => {
                    summary.served += 1;
                    debug!(
                        target: SERVER_TARGET,
                        status = response.status().code(),
                        "request served"
                    );
                }
                Err(error) => {
                    summary.gateway_errors += 1;
                    warn!(target: SERVER_TARGET, %error, "failed to deliver response");
                }
            }
        }
        debug!(
            target: SERVER_TARGET,
            served = summary.served,
            gateway_errors = summary.gateway_errors,
            "request loop finished"
        );
        summary
    }

    /// Adapter answering requests.
    #[must_use]
    pub const fn adapter(&self) -> &ProtocolAdapter<S> {
        &self.adapter
    }

    /// Releases the gateway, for example to inspect a test double.
    #[must_use]
    pub fn into_gateway(self) -> G {
        self.gateway
    }
}
