//! # lbmon SNMP
//!
//! SNMPv1 GetNext walker for load-balancer counter tables.
//!
//! ## Modules
//!
//! - [`ber`]: BER primitives (lengths, integers, oids)
//! - [`pdu`]: SNMPv1 message encode/decode
//! - [`sequence`]: shared request id counter
//! - [`transport`]: datagram transport seam and the UDP implementation
//! - [`walk`]: the walk engine with retry, backoff and termination rules

pub mod ber;
pub mod pdu;
pub mod sequence;
pub mod transport;
pub mod walk;

pub use ber::DecodeError;
pub use pdu::{Message, Pdu, PduKind, Value, VarBind};
pub use sequence::RequestSequence;
pub use transport::{Connector, Transport, UdpConnector};
pub use walk::{evaluate, SnmpWalker, Termination, WalkConfig, Walker};
