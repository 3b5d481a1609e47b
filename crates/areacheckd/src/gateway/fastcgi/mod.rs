//! FastCGI responder gateway.
//!
//! The gateway serves one connection and one request at a time. Management
//! records are answered inline, requests for roles other than responder are
//! refused with `FCGI_UNKNOWN_ROLE`, and a second request id on a busy
//! connection is refused with `FCGI_CANT_MPX_CONN`. Connections opened with
//! `FCGI_KEEP_CONN` stay open for the next request.

mod record;

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use areacheck_config::SocketEndpoint;

use self::record::{
    BeginRequest, MANAGEMENT_REQUEST_ID, ProtocolStatus, ROLE_RESPONDER, Record, RecordType,
    decode_pairs, encode_pair, read_record_after, write_end_request, write_record, write_stream,
    write_unknown_type,
};
use super::{
    ConnectionStream, GATEWAY_TARGET, Gateway, GatewayError, GatewayRequest, ListenerError,
    SocketListener,
};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
/// Read timeout used while an idle connection waits for its next request.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Upper bound on the encoded parameter block of one request.
const MAX_PARAMS_BYTES: usize = 64 * 1024;
/// Stdin beyond this many bytes is read and discarded.
const MAX_STDIN_BYTES: usize = 1024 * 1024;

/// FastCGI responder bound to a socket endpoint.
#[derive(Debug)]
pub struct FastCgiGateway {
    listener: SocketListener,
    shutdown: Arc<AtomicBool>,
    connection: Option<ConnectionStream>,
    active: Option<ActiveRequest>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveRequest {
    id: u16,
    keep_conn: bool,
}

#[derive(Debug)]
struct PendingRequest {
    id: u16,
    keep_conn: bool,
    params: Vec<u8>,
    params_done: bool,
    stdin: Vec<u8>,
    stdin_done: bool,
}

impl PendingRequest {
    const fn new(id: u16, keep_conn: bool) -> Self {
        Self {
            id,
            keep_conn,
            params: Vec::new(),
            params_done: false,
            stdin: Vec::new(),
            stdin_done: false,
        }
    }

    const fn is_complete(&self) -> bool {
        self.params_done && self.stdin_done
    }

    fn into_request(self) -> Result<(ActiveRequest, GatewayRequest), GatewayError> {
        let params: BTreeMap<String, String> = decode_pairs(&self.params)?.into_iter().collect();
        let active = ActiveRequest {
            id: self.id,
            keep_conn: self.keep_conn,
        };
        Ok((active, GatewayRequest::new(params, self.stdin)))
    }
}

enum Incoming {
    Request(GatewayRequest),
    Closed,
    Shutdown,
}

impl FastCgiGateway {
    /// Binds the gateway socket.
    ///
    /// `shutdown` is polled between connections and while a connection is
    /// idle; once set, [`Gateway::accept`] returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the endpoint cannot be bound.
    pub fn bind(
        endpoint: &SocketEndpoint,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, ListenerError> {
        let listener = SocketListener::bind(endpoint)?;
        Ok(Self {
            listener,
            shutdown,
            connection: None,
            active: None,
        })
    }

    /// Endpoint the gateway listens on.
    #[must_use]
    pub fn endpoint(&self) -> &SocketEndpoint {
        self.listener.endpoint()
    }

    /// Bound TCP address, when listening on TCP.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn close_connection(&mut self) {
        if self.connection.take().is_some() {
            debug!(target: GATEWAY_TARGET, "gateway connection closed");
        }
        self.active = None;
    }

    fn read_next_request(&mut self) -> Result<Incoming, GatewayError> {
        let shutdown = Arc::clone(&self.shutdown);
        let Some(stream) = self.connection.as_mut() else {
            return Ok(Incoming::Closed);
        };
        let mut pending: Option<PendingRequest> = None;

        loop {
            let record = if pending.is_none() {
                match wait_for_record(stream, &shutdown)? {
                    Waited::Record(record) => record,
                    Waited::Closed => return Ok(Incoming::Closed),
                    Waited::Shutdown => return Ok(Incoming::Shutdown),
                }
            } else {
                match record::read_record(stream)? {
                    Some(record) => record,
                    None => {
                        return Err(GatewayError::protocol(
                            "connection closed before the request was complete",
                        ));
                    }
                }
            };

            if record.request_id == MANAGEMENT_REQUEST_ID {
                answer_management(stream, &record)?;
                continue;
            }

            match record.kind {
                RecordType::BeginRequest => {
                    let begin = BeginRequest::parse(&record.content)?;
                    if let Some(current) = pending.as_ref() {
                        warn!(
                            target: GATEWAY_TARGET,
                            active = current.id,
                            rejected = record.request_id,
                            "refusing multiplexed request"
                        );
                        write_end_request(
                            stream,
                            record.request_id,
                            0,
                            ProtocolStatus::CantMpxConn,
                        )?;
                        stream.flush()?;
                        continue;
                    }
                    if begin.role != ROLE_RESPONDER {
                        warn!(
                            target: GATEWAY_TARGET,
                            role = begin.role,
                            request_id = record.request_id,
                            "refusing unsupported role"
                        );
                        write_end_request(
                            stream,
                            record.request_id,
                            0,
                            ProtocolStatus::UnknownRole,
                        )?;
                        stream.flush()?;
                        if !begin.keep_conn() {
                            return Ok(Incoming::Closed);
                        }
                        continue;
                    }
                    pending = Some(PendingRequest::new(record.request_id, begin.keep_conn()));
                }
                RecordType::AbortRequest => {
                    let Some(current) = pending.take_if(|current| current.id == record.request_id)
                    else {
                        continue;
                    };
                    info!(
                        target: GATEWAY_TARGET,
                        request_id = current.id,
                        "request aborted by web server"
                    );
                    write_end_request(stream, current.id, 0, ProtocolStatus::RequestComplete)?;
                    stream.flush()?;
                    if !current.keep_conn {
                        return Ok(Incoming::Closed);
                    }
                }
                RecordType::Params => {
                    if let Some(current) = matching(&mut pending, record.request_id) {
                        if record.content.is_empty() {
                            current.params_done = true;
                        } else if current.params.len() + record.content.len() > MAX_PARAMS_BYTES {
                            return Err(GatewayError::RequestTooLarge {
                                max_size: MAX_PARAMS_BYTES,
                            });
                        } else {
                            current.params.extend_from_slice(&record.content);
                        }
                    }
                }
                RecordType::Stdin => {
                    if let Some(current) = matching(&mut pending, record.request_id) {
                        if record.content.is_empty() {
                            current.stdin_done = true;
                        } else {
                            let room = MAX_STDIN_BYTES.saturating_sub(current.stdin.len());
                            let kept = record.content.get(..room).unwrap_or(record.content.as_slice());
                            current.stdin.extend_from_slice(kept);
                        }
                    }
                }
                other => {
                    debug!(
                        target: GATEWAY_TARGET,
                        kind = ?other,
                        request_id = record.request_id,
                        "ignoring record"
                    );
                }
            }

            if let Some(current) = pending.take_if(|current| current.is_complete()) {
                let (active, request) = current.into_request()?;
                self.active = Some(active);
                return Ok(Incoming::Request(request));
            }
        }
    }
}

impl Gateway for FastCgiGateway {
    fn accept(&mut self) -> Result<Option<GatewayRequest>, GatewayError> {
        loop {
            if self.shutdown_requested() {
                self.close_connection();
                return Ok(None);
            }

            if self.connection.is_none() {
                match self.listener.poll_accept() {
                    Ok(Some(stream)) => {
                        debug!(target: GATEWAY_TARGET, "gateway connection accepted");
                        self.connection = Some(stream);
                    }
                    Ok(None) => {
                        thread::sleep(ACCEPT_BACKOFF);
                        continue;
                    }
                    Err(source) => {
                        thread::sleep(ERROR_BACKOFF);
                        return Err(GatewayError::Accept { source });
                    }
                }
            }

            match self.read_next_request() {
                Ok(Incoming::Request(request)) => {
                    debug!(
                        target: GATEWAY_TARGET,
                        params = request.params().len(),
                        body_bytes = request.body().len(),
                        "request assembled"
                    );
                    return Ok(Some(request));
                }
                Ok(Incoming::Closed) => self.close_connection(),
                Ok(Incoming::Shutdown) => {
                    self.close_connection();
                    return Ok(None);
                }
                Err(error) => {
                    self.close_connection();
                    return Err(error);
                }
            }
        }
    }

    fn respond(&mut self, response: &[u8]) -> Result<(), GatewayError> {
        let active = self.active.take().ok_or(GatewayError::NoActiveRequest)?;
        let Some(stream) = self.connection.as_mut() else {
            return Err(GatewayError::NoActiveRequest);
        };

        if let Err(source) = write_response(stream, active.id, response) {
            self.close_connection();
            return Err(GatewayError::Io { source });
        }

        debug!(
            target: GATEWAY_TARGET,
            request_id = active.id,
            bytes = response.len(),
            "response written"
        );
        if !active.keep_conn {
            self.close_connection();
        }
        Ok(())
    }
}

fn write_response(stream: &mut ConnectionStream, request_id: u16, response: &[u8]) -> io::Result<()> {
    write_stream(stream, RecordType::Stdout, request_id, response)?;
    write_end_request(stream, request_id, 0, ProtocolStatus::RequestComplete)?;
    stream.flush()
}

enum Waited {
    Record(Record),
    Closed,
    Shutdown,
}

/// Waits for the first byte of the next record, polling the shutdown flag.
fn wait_for_record(
    stream: &mut ConnectionStream,
    shutdown: &AtomicBool,
) -> Result<Waited, GatewayError> {
    stream.set_read_timeout(Some(IDLE_POLL))?;
    let mut first = [0_u8; 1];
    let outcome = loop {
        if shutdown.load(Ordering::SeqCst) {
            break Waited::Shutdown;
        }
        match stream.read(&mut first) {
            Ok(0) => break Waited::Closed,
            Ok(_) => {
                stream.set_read_timeout(None)?;
                let [version] = first;
                break Waited::Record(read_record_after(stream, version)?);
            }
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) => {}
            Err(error) => return Err(error.into()),
        }
    };
    stream.set_read_timeout(None)?;
    Ok(outcome)
}

fn matching(pending: &mut Option<PendingRequest>, request_id: u16) -> Option<&mut PendingRequest> {
    pending.as_mut().filter(|current| current.id == request_id)
}

fn answer_management(stream: &mut ConnectionStream, record: &Record) -> Result<(), GatewayError> {
    match record.kind {
        RecordType::GetValues => {
            let mut reply = Vec::new();
            for (name, _) in decode_pairs(&record.content)? {
                if let Some(value) = capability_value(&name) {
                    encode_pair(&mut reply, &name, value);
                }
            }
            write_record(
                stream,
                RecordType::GetValuesResult,
                MANAGEMENT_REQUEST_ID,
                &reply,
            )?;
        }
        other => {
            debug!(
                target: GATEWAY_TARGET,
                kind = ?other,
                "unknown management record"
            );
            write_unknown_type(stream, other)?;
        }
    }
    stream.flush()?;
    Ok(())
}

fn capability_value(name: &str) -> Option<&'static str> {
    match name {
        "FCGI_MAX_CONNS" | "FCGI_MAX_REQS" => Some("1"),
        "FCGI_MPXS_CONNS" => Some("0"),
        _ => None,
    }
}
