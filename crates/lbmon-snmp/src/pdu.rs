//! SNMPv1 messages
//!
//! ```text
//! Message ::= SEQUENCE { version INTEGER, community OCTET STRING, data PDU }
//! PDU     ::= [tag] { request-id, error-status, error-index, VarBindList }
//! ```

use crate::ber::{self, DecodeError, Reader};
use bytes::{Bytes, BytesMut};
use lbmon_common::Oid;
use std::fmt;

/// SNMPv1 version field value
pub const SNMP_VERSION_1: i64 = 0;

/// PDU type, carried as the context tag of the PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduKind {
    GetRequest,
    GetNextRequest,
    GetResponse,
}

impl PduKind {
    pub fn tag(self) -> u8 {
        match self {
            PduKind::GetRequest => 0xa0,
            PduKind::GetNextRequest => 0xa1,
            PduKind::GetResponse => 0xa2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xa0 => Some(PduKind::GetRequest),
            0xa1 => Some(PduKind::GetNextRequest),
            0xa2 => Some(PduKind::GetResponse),
            _ => None,
        }
    }
}

/// Value half of a variable binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectId(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    /// True for the exception markers an agent returns instead of data
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Numeric reading of the value, if it has one that fits `u64`
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer(v) => u64::try_from(*v).ok(),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v as u64),
            Value::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Value::Integer(v) => ber::put_integer(buf, ber::TAG_INTEGER, *v),
            Value::OctetString(bytes) => ber::put_tlv(buf, ber::TAG_OCTET_STRING, bytes),
            Value::Null => ber::put_tlv(buf, ber::TAG_NULL, &[]),
            Value::ObjectId(oid) => ber::put_oid(buf, oid),
            Value::IpAddress(addr) => ber::put_tlv(buf, ber::TAG_IP_ADDRESS, addr),
            Value::Counter32(v) => ber::put_unsigned(buf, ber::TAG_COUNTER32, *v as u64),
            Value::Gauge32(v) => ber::put_unsigned(buf, ber::TAG_GAUGE32, *v as u64),
            Value::TimeTicks(v) => ber::put_unsigned(buf, ber::TAG_TIMETICKS, *v as u64),
            Value::Opaque(bytes) => ber::put_tlv(buf, ber::TAG_OPAQUE, bytes),
            Value::Counter64(v) => ber::put_unsigned(buf, ber::TAG_COUNTER64, *v),
            Value::NoSuchObject => ber::put_tlv(buf, ber::TAG_NO_SUCH_OBJECT, &[]),
            Value::NoSuchInstance => ber::put_tlv(buf, ber::TAG_NO_SUCH_INSTANCE, &[]),
            Value::EndOfMibView => ber::put_tlv(buf, ber::TAG_END_OF_MIB_VIEW, &[]),
        }
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let (tag, content) = reader.read_any()?;
        let small = |content: &[u8]| ber::decode_unsigned(content, 32).map(|v| v as u32);
        let value = match tag {
            ber::TAG_INTEGER => Value::Integer(ber::decode_signed(content)?),
            ber::TAG_OCTET_STRING => Value::OctetString(content.to_vec()),
            ber::TAG_NULL => Value::Null,
            ber::TAG_OID => Value::ObjectId(ber::decode_oid(content)?),
            ber::TAG_IP_ADDRESS => {
                let addr: [u8; 4] = content.try_into().map_err(|_| DecodeError::BadLength)?;
                Value::IpAddress(addr)
            }
            ber::TAG_COUNTER32 => Value::Counter32(small(content)?),
            ber::TAG_GAUGE32 => Value::Gauge32(small(content)?),
            ber::TAG_TIMETICKS => Value::TimeTicks(small(content)?),
            ber::TAG_OPAQUE => Value::Opaque(content.to_vec()),
            ber::TAG_COUNTER64 => Value::Counter64(ber::decode_unsigned(content, 64)?),
            ber::TAG_NO_SUCH_OBJECT => Value::NoSuchObject,
            ber::TAG_NO_SUCH_INSTANCE => Value::NoSuchInstance,
            ber::TAG_END_OF_MIB_VIEW => Value::EndOfMibView,
            other => return Err(DecodeError::UnsupportedTag(other)),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "INTEGER: {}", v),
            Value::OctetString(b) => write!(f, "STRING: {}", String::from_utf8_lossy(b)),
            Value::Null => write!(f, "NULL"),
            Value::ObjectId(oid) => write!(f, "OID: {}", oid),
            Value::IpAddress([a, b, c, d]) => write!(f, "IpAddress: {}.{}.{}.{}", a, b, c, d),
            Value::Counter32(v) => write!(f, "Counter32: {}", v),
            Value::Gauge32(v) => write!(f, "Gauge32: {}", v),
            Value::TimeTicks(v) => write!(f, "Timeticks: {}", v),
            Value::Opaque(b) => write!(f, "Opaque: {} bytes", b.len()),
            Value::Counter64(v) => write!(f, "Counter64: {}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

/// Variable binding: an oid and its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Binding with a NULL value, as sent in requests
    pub fn null(oid: Oid) -> Self {
        Self::new(oid, Value::Null)
    }
}

/// Protocol data unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub kind: PduKind,
    pub request_id: i32,
    pub error_status: i64,
    pub error_index: i64,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// GetNext request for a single oid
    pub fn get_next(request_id: i32, oid: Oid) -> Self {
        Self {
            kind: PduKind::GetNextRequest,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: vec![VarBind::null(oid)],
        }
    }

    /// Response answering `request_id` with the given bindings
    pub fn response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            kind: PduKind::GetResponse,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Set the error status and index
    pub fn with_error(mut self, status: i64, index: i64) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }
}

/// A complete SNMPv1 message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub community: Vec<u8>,
    pub pdu: Pdu,
}

impl Message {
    pub fn new(community: impl Into<Vec<u8>>, pdu: Pdu) -> Self {
        Self {
            community: community.into(),
            pdu,
        }
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64 + 32 * self.pdu.varbinds.len());
        ber::put_constructed(&mut buf, ber::TAG_SEQUENCE, |msg| {
            ber::put_integer(msg, ber::TAG_INTEGER, SNMP_VERSION_1);
            ber::put_tlv(msg, ber::TAG_OCTET_STRING, &self.community);
            ber::put_constructed(msg, self.pdu.kind.tag(), |pdu| {
                ber::put_integer(pdu, ber::TAG_INTEGER, self.pdu.request_id as i64);
                ber::put_integer(pdu, ber::TAG_INTEGER, self.pdu.error_status);
                ber::put_integer(pdu, ber::TAG_INTEGER, self.pdu.error_index);
                ber::put_constructed(pdu, ber::TAG_SEQUENCE, |list| {
                    for vb in &self.pdu.varbinds {
                        ber::put_constructed(list, ber::TAG_SEQUENCE, |entry| {
                            ber::put_oid(entry, &vb.oid);
                            vb.value.encode(entry);
                        });
                    }
                });
            });
        });
        buf.freeze()
    }

    /// Decode from wire bytes
    pub fn decode(datagram: &[u8]) -> Result<Self, DecodeError> {
        let mut outer = Reader::new(datagram);
        let mut msg = outer.read_constructed(ber::TAG_SEQUENCE)?;
        if !outer.is_empty() {
            return Err(DecodeError::TrailingBytes(outer.remaining()));
        }

        let version = msg.read_integer()?;
        if version != SNMP_VERSION_1 {
            return Err(DecodeError::BadVersion(version));
        }
        let community = msg.read_octets()?.to_vec();

        let tag = msg.peek_tag()?;
        let kind = PduKind::from_tag(tag).ok_or(DecodeError::UnsupportedTag(tag))?;
        let mut body = msg.read_constructed(tag)?;

        let request_id = body.read_integer()?;
        let request_id = i32::try_from(request_id).map_err(|_| DecodeError::IntegerOverflow(32))?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;

        let mut list = body.read_constructed(ber::TAG_SEQUENCE)?;
        let mut varbinds = Vec::new();
        while !list.is_empty() {
            let mut entry = list.read_constructed(ber::TAG_SEQUENCE)?;
            let oid = entry.read_oid()?;
            let value = Value::decode(&mut entry)?;
            varbinds.push(VarBind::new(oid, value));
        }

        Ok(Self {
            community,
            pdu: Pdu {
                kind,
                request_id,
                error_status,
                error_index,
                varbinds,
            },
        })
    }
}
