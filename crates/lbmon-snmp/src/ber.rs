//! BER primitives
//!
//! The subset of ASN.1 Basic Encoding Rules that SNMPv1 needs: definite
//! lengths, INTEGER, OCTET STRING, NULL, OBJECT IDENTIFIER and the
//! unsigned application types. Encoding writes into a `BytesMut`; decoding
//! walks a borrowed slice through [`Reader`].

use bytes::{BufMut, BytesMut};
use lbmon_common::Oid;
use thiserror::Error;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

pub const TAG_IP_ADDRESS: u8 = 0x40;
pub const TAG_COUNTER32: u8 = 0x41;
pub const TAG_GAUGE32: u8 = 0x42;
pub const TAG_TIMETICKS: u8 = 0x43;
pub const TAG_OPAQUE: u8 = 0x44;
pub const TAG_COUNTER64: u8 = 0x46;

pub const TAG_NO_SUCH_OBJECT: u8 = 0x80;
pub const TAG_NO_SUCH_INSTANCE: u8 = 0x81;
pub const TAG_END_OF_MIB_VIEW: u8 = 0x82;

/// Malformed or unsupported BER input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unexpected tag: expected 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedTag { expected: u8, actual: u8 },

    #[error("unsupported tag 0x{0:02x}")]
    UnsupportedTag(u8),

    #[error("unsupported length encoding")]
    BadLength,

    #[error("integer does not fit in {0} bits")]
    IntegerOverflow(u32),

    #[error("malformed object identifier")]
    BadOid,

    #[error("unsupported SNMP version {0}")]
    BadVersion(i64),

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}

/// Write a definite length
pub fn put_length(buf: &mut BytesMut, len: usize) {
    if len < 0x80 {
        buf.put_u8(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    buf.put_u8(0x80 | significant.len() as u8);
    buf.put_slice(significant);
}

/// Write a tag, a length and `content`
pub fn put_tlv(buf: &mut BytesMut, tag: u8, content: &[u8]) {
    buf.put_u8(tag);
    put_length(buf, content.len());
    buf.put_slice(content);
}

/// Write a signed integer in minimal two's complement form
pub fn put_integer(buf: &mut BytesMut, tag: u8, value: i64) {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    // Drop redundant sign bytes while the next byte still carries the sign
    while start < bytes.len() - 1 {
        let (cur, next) = (bytes[start], bytes[start + 1]);
        if (cur == 0x00 && next & 0x80 == 0) || (cur == 0xff && next & 0x80 != 0) {
            start += 1;
        } else {
            break;
        }
    }
    put_tlv(buf, tag, &bytes[start..]);
}

/// Write an unsigned integer (Counter32, Gauge32, TimeTicks, Counter64)
pub fn put_unsigned(buf: &mut BytesMut, tag: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let significant = &bytes[skip..];
    if significant[0] & 0x80 != 0 {
        let mut content = Vec::with_capacity(significant.len() + 1);
        content.push(0);
        content.extend_from_slice(significant);
        put_tlv(buf, tag, &content);
    } else {
        put_tlv(buf, tag, significant);
    }
}

fn put_base128(content: &mut Vec<u8>, mut value: u32) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    loop {
        groups[n] = (value & 0x7f) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        content.push(groups[i] | continuation);
    }
}

/// Write an OBJECT IDENTIFIER
pub fn put_oid(buf: &mut BytesMut, oid: &Oid) {
    let arcs = oid.arcs();
    let mut content = Vec::with_capacity(arcs.len() + 4);
    match arcs {
        [] => content.push(0),
        [first] => put_base128(&mut content, first.saturating_mul(40)),
        [first, second, rest @ ..] => {
            put_base128(
                &mut content,
                first.saturating_mul(40).saturating_add(*second),
            );
            for arc in rest {
                put_base128(&mut content, *arc);
            }
        }
    }
    put_tlv(buf, TAG_OID, &content);
}

/// Wrap whatever `body` writes in a constructed TLV with the given tag
pub fn put_constructed(buf: &mut BytesMut, tag: u8, body: impl FnOnce(&mut BytesMut)) {
    let mut inner = BytesMut::new();
    body(&mut inner);
    put_tlv(buf, tag, &inner);
}

/// Cursor over BER-encoded input
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    input: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.input.len() < n {
            return Err(DecodeError::Truncated {
                needed: n,
                available: self.input.len(),
            });
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    /// Tag of the next element without consuming it
    pub fn peek_tag(&self) -> Result<u8, DecodeError> {
        self.input.first().copied().ok_or(DecodeError::Truncated {
            needed: 1,
            available: 0,
        })
    }

    fn read_length(&mut self) -> Result<usize, DecodeError> {
        let first = self.take(1)?[0];
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        // Indefinite form (0x80) is not allowed in SNMP
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(DecodeError::BadLength);
        }
        Ok(self
            .take(count)?
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize))
    }

    /// Read any TLV, returning its tag and content
    pub fn read_any(&mut self) -> Result<(u8, &'a [u8]), DecodeError> {
        let tag = self.take(1)?[0];
        let len = self.read_length()?;
        let content = self.take(len)?;
        Ok((tag, content))
    }

    /// Read a TLV that must carry `expected`
    pub fn read_tagged(&mut self, expected: u8) -> Result<&'a [u8], DecodeError> {
        let (tag, content) = self.read_any()?;
        if tag != expected {
            return Err(DecodeError::UnexpectedTag {
                expected,
                actual: tag,
            });
        }
        Ok(content)
    }

    /// Read a constructed element and return a reader over its content
    pub fn read_constructed(&mut self, expected: u8) -> Result<Reader<'a>, DecodeError> {
        self.read_tagged(expected).map(Reader::new)
    }

    /// Read a signed INTEGER
    pub fn read_integer(&mut self) -> Result<i64, DecodeError> {
        let content = self.read_tagged(TAG_INTEGER)?;
        decode_signed(content)
    }

    /// Read an OCTET STRING
    pub fn read_octets(&mut self) -> Result<&'a [u8], DecodeError> {
        self.read_tagged(TAG_OCTET_STRING)
    }

    /// Read an OBJECT IDENTIFIER
    pub fn read_oid(&mut self) -> Result<Oid, DecodeError> {
        let content = self.read_tagged(TAG_OID)?;
        decode_oid(content)
    }
}

/// Decode two's complement content
pub fn decode_signed(content: &[u8]) -> Result<i64, DecodeError> {
    if content.is_empty() {
        return Err(DecodeError::BadLength);
    }
    if content.len() > 8 {
        return Err(DecodeError::IntegerOverflow(64));
    }
    let negative = content[0] & 0x80 != 0;
    let init: i64 = if negative { -1 } else { 0 };
    Ok(content.iter().fold(init, |acc, b| (acc << 8) | *b as i64))
}

/// Decode unsigned content of at most `bits` bits. Leading zero padding of
/// any length is accepted.
pub fn decode_unsigned(content: &[u8], bits: u32) -> Result<u64, DecodeError> {
    if content.is_empty() {
        return Err(DecodeError::BadLength);
    }
    let content = match content.iter().position(|b| *b != 0) {
        Some(first) => &content[first..],
        None => return Ok(0),
    };
    if content.len() > (bits as usize).div_ceil(8) {
        return Err(DecodeError::IntegerOverflow(bits));
    }
    let value = content.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
    if bits < 64 && value >> bits != 0 {
        return Err(DecodeError::IntegerOverflow(bits));
    }
    Ok(value)
}

/// Decode OBJECT IDENTIFIER content
pub fn decode_oid(content: &[u8]) -> Result<Oid, DecodeError> {
    let mut subids = Vec::with_capacity(content.len() + 1);
    let mut acc: u32 = 0;
    let mut pending = false;
    for b in content {
        if acc > (u32::MAX >> 7) {
            return Err(DecodeError::BadOid);
        }
        acc = (acc << 7) | (*b & 0x7f) as u32;
        pending = b & 0x80 != 0;
        if !pending {
            subids.push(acc);
            acc = 0;
        }
    }
    if pending || subids.is_empty() {
        return Err(DecodeError::BadOid);
    }

    let first = subids[0];
    let mut arcs = Vec::with_capacity(subids.len() + 1);
    match first {
        0..=39 => arcs.extend([0, first]),
        40..=79 => arcs.extend([1, first - 40]),
        _ => arcs.extend([2, first - 80]),
    }
    arcs.extend_from_slice(&subids[1..]);
    Ok(Oid::new(arcs))
}
