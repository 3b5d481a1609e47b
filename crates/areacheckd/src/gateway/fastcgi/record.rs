//! FastCGI record framing.
//!
//! Every record starts with an eight byte header: version, type, request id
//! (big endian), content length (big endian), padding length and a reserved
//! byte. Content is followed by `padding` bytes the receiver discards.

use std::io::{self, Read, Write};

use crate::gateway::GatewayError;
use crate::gateway::stream::read_exact_or_eof;

pub(crate) const FCGI_VERSION_1: u8 = 1;
pub(crate) const HEADER_LEN: usize = 8;
pub(crate) const MAX_CONTENT_LEN: usize = 65_535;

/// Management records use request id zero.
pub(crate) const MANAGEMENT_REQUEST_ID: u16 = 0;
pub(crate) const ROLE_RESPONDER: u16 = 1;
pub(crate) const FLAG_KEEP_CONN: u8 = 1;

/// Record types defined by the FastCGI 1.0 specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordType {
    BeginRequest,
    AbortRequest,
    EndRequest,
    Params,
    Stdin,
    Stdout,
    Stderr,
    Data,
    GetValues,
    GetValuesResult,
    UnknownType,
    Other(u8),
}

impl RecordType {
    pub(crate) const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::BeginRequest,
            2 => Self::AbortRequest,
            3 => Self::EndRequest,
            4 => Self::Params,
            5 => Self::Stdin,
            6 => Self::Stdout,
            7 => Self::Stderr,
            8 => Self::Data,
            9 => Self::GetValues,
            10 => Self::GetValuesResult,
            11 => Self::UnknownType,
            other => Self::Other(other),
        }
    }

    pub(crate) const fn as_byte(self) -> u8 {
        match self {
            Self::BeginRequest => 1,
            Self::AbortRequest => 2,
            Self::EndRequest => 3,
            Self::Params => 4,
            Self::Stdin => 5,
            Self::Stdout => 6,
            Self::Stderr => 7,
            Self::Data => 8,
            Self::GetValues => 9,
            Self::GetValuesResult => 10,
            Self::UnknownType => 11,
            Self::Other(byte) => byte,
        }
    }
}

/// Completion status carried by an `FCGI_END_REQUEST` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolStatus {
    RequestComplete,
    CantMpxConn,
    UnknownRole,
}

impl ProtocolStatus {
    const fn as_byte(self) -> u8 {
        match self {
            Self::RequestComplete => 0,
            Self::CantMpxConn => 1,
            Self::UnknownRole => 3,
        }
    }
}

/// Decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub(crate) kind: RecordType,
    pub(crate) request_id: u16,
    pub(crate) content: Vec<u8>,
}

/// Body of an `FCGI_BEGIN_REQUEST` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BeginRequest {
    pub(crate) role: u16,
    pub(crate) flags: u8,
}

impl BeginRequest {
    pub(crate) fn parse(content: &[u8]) -> Result<Self, GatewayError> {
        match content {
            [role_hi, role_lo, flags, ..] => Ok(Self {
                role: u16::from_be_bytes([*role_hi, *role_lo]),
                flags: *flags,
            }),
            _ => Err(GatewayError::protocol("begin request body is truncated")),
        }
    }

    pub(crate) const fn keep_conn(self) -> bool {
        self.flags & FLAG_KEEP_CONN != 0
    }
}

/// Reads the remainder of a record whose first header byte has been consumed.
pub(crate) fn read_record_after<R: Read>(
    reader: &mut R,
    first: u8,
) -> Result<Record, GatewayError> {
    let mut rest = [0_u8; HEADER_LEN - 1];
    if !read_exact_or_eof(reader, &mut rest)? {
        return Err(GatewayError::protocol("connection closed inside a header"));
    }
    let [kind, id_hi, id_lo, len_hi, len_lo, padding, _reserved] = rest;
    if first != FCGI_VERSION_1 {
        return Err(GatewayError::protocol(format!(
            "unsupported record version {first}"
        )));
    }

    // Empty buffers always read successfully, so `false` means a short read.
    let mut content = vec![0_u8; usize::from(u16::from_be_bytes([len_hi, len_lo]))];
    if !read_exact_or_eof(reader, &mut content)? {
        return Err(GatewayError::protocol("connection closed inside content"));
    }
    let mut discard = [0_u8; 255];
    if let Some(padding) = discard.get_mut(..usize::from(padding))
        && !read_exact_or_eof(reader, padding)?
    {
        return Err(GatewayError::protocol("connection closed inside padding"));
    }

    Ok(Record {
        kind: RecordType::from_byte(kind),
        request_id: u16::from_be_bytes([id_hi, id_lo]),
        content,
    })
}

/// Reads one record, returning `Ok(None)` on a clean end of stream.
pub(crate) fn read_record<R: Read>(reader: &mut R) -> Result<Option<Record>, GatewayError> {
    let mut first = [0_u8; 1];
    if !read_exact_or_eof(reader, &mut first)? {
        return Ok(None);
    }
    let [version] = first;
    read_record_after(reader, version).map(Some)
}

/// Writes a single record. `content` must not exceed [`MAX_CONTENT_LEN`].
pub(crate) fn write_record<W: Write>(
    writer: &mut W,
    kind: RecordType,
    request_id: u16,
    content: &[u8],
) -> io::Result<()> {
    let length = u16::try_from(content.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "record content exceeds 65535 bytes")
    })?;
    let padding = padding_for(content.len());
    let [id_hi, id_lo] = request_id.to_be_bytes();
    let [len_hi, len_lo] = length.to_be_bytes();
    writer.write_all(&[
        FCGI_VERSION_1,
        kind.as_byte(),
        id_hi,
        id_lo,
        len_hi,
        len_lo,
        padding,
        0,
    ])?;
    writer.write_all(content)?;
    let zeros = [0_u8; 8];
    writer.write_all(zeros.get(..usize::from(padding)).unwrap_or_default())
}

/// Writes `data` as a stream: as many records as needed, then an empty one.
pub(crate) fn write_stream<W: Write>(
    writer: &mut W,
    kind: RecordType,
    request_id: u16,
    data: &[u8],
) -> io::Result<()> {
    for chunk in data.chunks(MAX_CONTENT_LEN) {
        write_record(writer, kind, request_id, chunk)?;
    }
    write_record(writer, kind, request_id, &[])
}

/// Writes an `FCGI_END_REQUEST` record.
pub(crate) fn write_end_request<W: Write>(
    writer: &mut W,
    request_id: u16,
    app_status: u32,
    status: ProtocolStatus,
) -> io::Result<()> {
    let [a, b, c, d] = app_status.to_be_bytes();
    write_record(
        writer,
        RecordType::EndRequest,
        request_id,
        &[a, b, c, d, status.as_byte(), 0, 0, 0],
    )
}

/// Writes an `FCGI_UNKNOWN_TYPE` reply for an unrecognised management record.
pub(crate) fn write_unknown_type<W: Write>(writer: &mut W, kind: RecordType) -> io::Result<()> {
    write_record(
        writer,
        RecordType::UnknownType,
        MANAGEMENT_REQUEST_ID,
        &[kind.as_byte(), 0, 0, 0, 0, 0, 0, 0],
    )
}

fn padding_for(len: usize) -> u8 {
    // The remainder of a division by eight always fits in a byte.
    u8::try_from((8 - len % 8) % 8).unwrap_or(0)
}

/// Decodes a block of name-value pairs.
pub(crate) fn decode_pairs(mut input: &[u8]) -> Result<Vec<(String, String)>, GatewayError> {
    let mut pairs = Vec::new();
    while !input.is_empty() {
        let name_len = take_length(&mut input)?;
        let value_len = take_length(&mut input)?;
        let name = take_bytes(&mut input, name_len)?;
        let value = take_bytes(&mut input, value_len)?;
        pairs.push((
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        ));
    }
    Ok(pairs)
}

/// Appends one name-value pair to `out`.
pub(crate) fn encode_pair(out: &mut Vec<u8>, name: &str, value: &str) {
    put_length(out, name.len());
    put_length(out, value.len());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn take_length(input: &mut &[u8]) -> Result<usize, GatewayError> {
    let bytes = *input;
    match bytes {
        [first, rest @ ..] if first & 0x80 == 0 => {
            *input = rest;
            Ok(usize::from(*first))
        }
        [b0, b1, b2, b3, rest @ ..] => {
            *input = rest;
            let length = u32::from_be_bytes([b0 & 0x7f, *b1, *b2, *b3]);
            usize::try_from(length).map_err(|_| GatewayError::protocol("pair length overflow"))
        }
        _ => Err(GatewayError::protocol("truncated name-value length")),
    }
}

fn take_bytes<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], GatewayError> {
    let bytes: &'a [u8] = input;
    match bytes.split_at_checked(len) {
        Some((head, tail)) => {
            *input = tail;
            Ok(head)
        }
        None => Err(GatewayError::protocol("truncated name-value pair")),
    }
}

fn put_length(out: &mut Vec<u8>, len: usize) {
    match u8::try_from(len) {
        Ok(short) if short < 0x80 => out.push(short),
        _ => {
            let long = u32::try_from(len).unwrap_or(u32::MAX >> 1) | 0x8000_0000;
            out.extend_from_slice(&long.to_be_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[test]
    fn writes_padded_records() {
        let mut out = Vec::new();
        write_record(&mut out, RecordType::Stdout, 1, b"hello").expect("write");
        assert_eq!(
            out,
            [1, 6, 0, 1, 0, 5, 3, 0, b'h', b'e', b'l', b'l', b'o', 0, 0, 0]
        );
    }

    #[test]
    fn reads_back_written_record_and_skips_padding() {
        let mut out = Vec::new();
        write_record(&mut out, RecordType::Params, 7, b"abc").expect("write");
        write_record(&mut out, RecordType::Stdin, 7, &[]).expect("write");

        let mut reader = Cursor::new(out);
        let first = read_record(&mut reader).expect("read").expect("record");
        assert_eq!(first.kind, RecordType::Params);
        assert_eq!(first.request_id, 7);
        assert_eq!(first.content, b"abc");
        let second = read_record(&mut reader).expect("read").expect("record");
        assert_eq!(second.kind, RecordType::Stdin);
        assert!(second.content.is_empty());
        assert!(read_record(&mut reader).expect("read").is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut reader = Cursor::new(vec![2_u8, 1, 0, 1, 0, 0, 0, 0]);
        let error = read_record(&mut reader).expect_err("bad version");
        assert!(matches!(error, GatewayError::Protocol { .. }));
    }

    #[test]
    fn splits_large_streams() {
        let data = vec![b'x'; MAX_CONTENT_LEN + 10];
        let mut out = Vec::new();
        write_stream(&mut out, RecordType::Stdout, 3, &data).expect("write");

        let mut reader = Cursor::new(out);
        let mut lengths = Vec::new();
        while let Some(record) = read_record(&mut reader).expect("read") {
            assert_eq!(record.kind, RecordType::Stdout);
            lengths.push(record.content.len());
        }
        assert_eq!(lengths, vec![MAX_CONTENT_LEN, 10, 0]);
    }

    #[rstest]
    #[case("SCRIPT_NAME", "/fcgi-bin/areacheck")]
    #[case("QUERY_STRING", "")]
    #[case("LONG", "v".repeat(300))]
    fn name_value_pairs_round_trip(#[case] name: &str, #[case] value: String) {
        let mut out = Vec::new();
        encode_pair(&mut out, name, &value);
        let pairs = decode_pairs(&out).expect("decode");
        assert_eq!(pairs, vec![(name.to_owned(), value)]);
    }

    #[test]
    fn long_lengths_use_four_bytes() {
        let mut out = Vec::new();
        encode_pair(&mut out, "N", &"v".repeat(200));
        assert_eq!(out.get(..5), Some(&[1_u8, 0x80, 0, 0, 200][..]));
    }

    #[test]
    fn truncated_pairs_are_rejected() {
        let error = decode_pairs(&[4, 2, b'a']).expect_err("truncated");
        assert!(matches!(error, GatewayError::Protocol { .. }));
    }

    #[test]
    fn end_request_carries_status() {
        let mut out = Vec::new();
        write_end_request(&mut out, 9, 0, ProtocolStatus::UnknownRole).expect("write");
        assert_eq!(out, [1, 3, 0, 9, 0, 8, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0]);
    }

    #[test]
    fn begin_request_reads_role_and_flags() {
        let begin = BeginRequest::parse(&[0, 1, 1, 0, 0, 0, 0, 0]).expect("parse");
        assert_eq!(begin.role, ROLE_RESPONDER);
        assert!(begin.keep_conn());
    }
}
