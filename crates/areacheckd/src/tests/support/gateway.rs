//! In-memory gateway that replays a fixed script of requests.

use std::collections::{BTreeSet, VecDeque};
use std::io;

use crate::gateway::{Gateway, GatewayError, GatewayRequest};

/// Gateway that yields scripted requests and records every response.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    incoming: VecDeque<Result<GatewayRequest, GatewayError>>,
    failing_responses: BTreeSet<usize>,
    respond_calls: usize,
    responses: Vec<Vec<u8>>,
}

impl ScriptedGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request.
    #[must_use]
    pub fn with_request(mut self, request: GatewayRequest) -> Self {
        self.incoming.push_back(Ok(request));
        self
    }

    /// Queues an accept failure.
    #[must_use]
    pub fn with_accept_error(mut self, message: &str) -> Self {
        self.incoming.push_back(Err(GatewayError::protocol(message)));
        self
    }

    /// Makes the `index`-th call to `respond` (zero based) fail.
    #[must_use]
    pub fn failing_response(mut self, index: usize) -> Self {
        self.failing_responses.insert(index);
        self
    }

    /// Responses delivered successfully, in order.
    #[must_use]
    pub fn responses(&self) -> &[Vec<u8>] {
        &self.responses
    }

    /// Number of `respond` calls, failed ones included.
    #[must_use]
    pub const fn respond_calls(&self) -> usize {
        self.respond_calls
    }
}

impl Gateway for ScriptedGateway {
    fn accept(&mut self) -> Result<Option<GatewayRequest>, GatewayError> {
        match self.incoming.pop_front() {
            Some(Ok(request)) => Ok(Some(request)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }

    fn respond(&mut self, response: &[u8]) -> Result<(), GatewayError> {
        let index = self.respond_calls;
        self.respond_calls += 1;
        if self.failing_responses.contains(&index) {
            return Err(GatewayError::Io {
                source: io::Error::new(io::ErrorKind::BrokenPipe, "web server went away"),
            });
        }
        self.responses.push(response.to_vec());
        Ok(())
    }
}
