//! Virtual-server name codec
//!
//! Counter tables on the appliance index each row by the virtual-server name,
//! written as a length arc followed by one arc per character code:
//!
//! ```text
//! 1.3.6.1.4.1.7146.1.2.2.2.1.<column>.<len>.<c1>.<c2>...
//! |<------------- 14 arcs ------------->|
//! ```

use lbmon_common::{Oid, VS_NAME_PREFIX_ARCS};

/// Recover the virtual-server name from a counter oid.
///
/// Drops the first 14 arcs and reads every remaining arc as a character code.
/// Lenient on purpose: an oid with too few arcs gives an empty or truncated
/// name, and arcs that are not valid code points become U+FFFD.
pub fn decode(oid: &Oid) -> String {
    oid.arcs()
        .iter()
        .skip(VS_NAME_PREFIX_ARCS)
        .map(|arc| char::from_u32(*arc).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Build the row oid for `name` under a counter column (`column.len.chars`)
pub fn encode_index(column: &Oid, name: &str) -> Oid {
    let codes: Vec<u32> = name.chars().map(|c| c as u32).collect();
    let mut index = Vec::with_capacity(codes.len() + 1);
    index.push(codes.len() as u32);
    index.extend(codes);
    column.child(&index)
}
