//! Minimal FastCGI client playing the web server side in gateway tests.

use std::io::{self, Read, Write};

pub const BEGIN_REQUEST: u8 = 1;
pub const ABORT_REQUEST: u8 = 2;
pub const END_REQUEST: u8 = 3;
pub const PARAMS: u8 = 4;
pub const STDIN: u8 = 5;
pub const STDOUT: u8 = 6;
pub const GET_VALUES: u8 = 9;
pub const GET_VALUES_RESULT: u8 = 10;
pub const UNKNOWN_TYPE: u8 = 11;

pub const RESPONDER: u16 = 1;
pub const AUTHORIZER: u16 = 2;

pub const REQUEST_COMPLETE: u8 = 0;
pub const CANT_MPX_CONN: u8 = 1;
pub const UNKNOWN_ROLE: u8 = 3;

/// One record as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub kind: u8,
    pub request_id: u16,
    pub content: Vec<u8>,
}

/// Everything the responder sent for one request id.
#[derive(Debug, Clone, Default)]
pub struct ClientResponse {
    pub stdout: Vec<u8>,
    pub stdout_records: usize,
    pub app_status: u32,
    pub protocol_status: u8,
}

impl ClientResponse {
    /// Stdout decoded as UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout should be UTF-8")
    }

    /// JSON body following the blank line.
    #[must_use]
    pub fn body(&self) -> String {
        let text = self.text();
        let (_, body) = text
            .split_once("\r\n\r\n")
            .expect("response should contain a blank line");
        body.to_owned()
    }
}

/// Client side of one FastCGI connection.
pub struct FastCgiClient<S> {
    stream: S,
}

impl<S: Read + Write> FastCgiClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn write_record(&mut self, kind: u8, request_id: u16, content: &[u8]) -> io::Result<()> {
        let length = u16::try_from(content.len()).expect("record content too long");
        let [id_hi, id_lo] = request_id.to_be_bytes();
        let [len_hi, len_lo] = length.to_be_bytes();
        self.stream
            .write_all(&[1, kind, id_hi, id_lo, len_hi, len_lo, 0, 0])?;
        self.stream.write_all(content)
    }

    pub fn begin(&mut self, request_id: u16, role: u16, keep_conn: bool) -> io::Result<()> {
        let [role_hi, role_lo] = role.to_be_bytes();
        let flags = u8::from(keep_conn);
        self.write_record(
            BEGIN_REQUEST,
            request_id,
            &[role_hi, role_lo, flags, 0, 0, 0, 0, 0],
        )
    }

    pub fn params(&mut self, request_id: u16, params: &[(&str, &str)]) -> io::Result<()> {
        let mut encoded = Vec::new();
        for (name, value) in params {
            encode_pair(&mut encoded, name, value);
        }
        for chunk in encoded.chunks(1024) {
            self.write_record(PARAMS, request_id, chunk)?;
        }
        self.write_record(PARAMS, request_id, &[])
    }

    pub fn stdin(&mut self, request_id: u16, body: &[u8]) -> io::Result<()> {
        for chunk in body.chunks(1024) {
            self.write_record(STDIN, request_id, chunk)?;
        }
        self.write_record(STDIN, request_id, &[])
    }

    pub fn abort(&mut self, request_id: u16) -> io::Result<()> {
        self.write_record(ABORT_REQUEST, request_id, &[])
    }

    pub fn get_values(&mut self, names: &[&str]) -> io::Result<()> {
        let mut encoded = Vec::new();
        for name in names {
            encode_pair(&mut encoded, name, "");
        }
        self.write_record(GET_VALUES, 0, &encoded)
    }

    /// Sends a complete responder request.
    pub fn send_request(
        &mut self,
        request_id: u16,
        keep_conn: bool,
        params: &[(&str, &str)],
        body: &[u8],
    ) -> io::Result<()> {
        self.begin(request_id, RESPONDER, keep_conn)?;
        self.params(request_id, params)?;
        self.stdin(request_id, body)?;
        self.stream.flush()
    }

    /// Reads the next record, or `None` once the responder closed.
    pub fn read_record(&mut self) -> io::Result<Option<RawRecord>> {
        let mut header = [0_u8; 8];
        match self.stream.read_exact(&mut header) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        }
        let [version, kind, id_hi, id_lo, len_hi, len_lo, padding, _] = header;
        assert_eq!(version, 1, "unexpected FastCGI version");
        let mut content = vec![0_u8; usize::from(u16::from_be_bytes([len_hi, len_lo]))];
        self.stream.read_exact(&mut content)?;
        let mut pad = vec![0_u8; usize::from(padding)];
        self.stream.read_exact(&mut pad)?;
        Ok(Some(RawRecord {
            kind,
            request_id: u16::from_be_bytes([id_hi, id_lo]),
            content,
        }))
    }

    /// Collects stdout until `FCGI_END_REQUEST` for `request_id` arrives.
    pub fn read_response(&mut self, request_id: u16) -> io::Result<ClientResponse> {
        let mut response = ClientResponse::default();
        loop {
            let record = self.read_record()?.ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "closed before END_REQUEST")
            })?;
            assert_eq!(record.request_id, request_id, "record for another request");
            match record.kind {
                STDOUT => {
                    response.stdout_records += 1;
                    response.stdout.extend_from_slice(&record.content);
                }
                END_REQUEST => {
                    let [a, b, c, d, status, ..] = record.content.as_slice() else {
                        panic!("short END_REQUEST body");
                    };
                    response.app_status = u32::from_be_bytes([*a, *b, *c, *d]);
                    response.protocol_status = *status;
                    return Ok(response);
                }
                other => panic!("unexpected record type {other}"),
            }
        }
    }

    /// Reads the end-of-request record sent for a refused or aborted request.
    pub fn read_end_request(&mut self) -> io::Result<(u16, u8)> {
        let record = self
            .read_record()?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"))?;
        assert_eq!(record.kind, END_REQUEST, "expected END_REQUEST");
        let status = record.content.get(4).copied().expect("protocol status");
        Ok((record.request_id, status))
    }

    /// Returns true when the responder closed the connection.
    pub fn is_closed(&mut self) -> bool {
        matches!(self.read_record(), Ok(None))
    }
}

/// Decodes a name-value pair block.
#[must_use]
pub fn decode_pairs(mut input: &[u8]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    while !input.is_empty() {
        let name_len = take_length(&mut input);
        let value_len = take_length(&mut input);
        let (name, rest) = input.split_at(name_len);
        let (value, rest) = rest.split_at(value_len);
        pairs.push((
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        ));
        input = rest;
    }
    pairs
}

fn take_length(input: &mut &[u8]) -> usize {
    let bytes = *input;
    match bytes {
        [first, rest @ ..] if *first < 0x80 => {
            *input = rest;
            usize::from(*first)
        }
        [a, b, c, d, rest @ ..] => {
            *input = rest;
            let length = u32::from_be_bytes([*a & 0x7f, *b, *c, *d]);
            usize::try_from(length).expect("length fits usize")
        }
        _ => panic!("truncated name-value length"),
    }
}

fn encode_pair(out: &mut Vec<u8>, name: &str, value: &str) {
    for length in [name.len(), value.len()] {
        if length < 0x80 {
            out.push(u8::try_from(length).expect("short length"));
        } else {
            let length = u32::try_from(length).expect("length fits u32") | 0x8000_0000;
            out.extend_from_slice(&length.to_be_bytes());
        }
    }
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(value.as_bytes());
}
