//! Building a DNS query message.
//!
//! Queries are small and of entirely predictable shape, so building one is
//! a single pass: header, question, done. The builder keeps the two octet
//! length prefix for stream transports in front of the actual message, as
//! demanded by [RFC 1035], section 4.2.2:
//!
//! > The message is prefixed with a two byte length field which gives the
//! > message length, excluding the two byte length field.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::header::Header;
use super::iana::{Class, Rtype};
use super::name::Name;

//------------ QueryBuilder --------------------------------------------------

/// A builder for a DNS query message.
///
/// The finished message always asks a single question, has recursion
/// desired set, and uses message ID 0: the transport runs one query per
/// connection, so there are never two messages in flight the ID would
/// have to tell apart.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    /// The message octets, preceded by the stream framing length.
    target: Vec<u8>,
}

impl QueryBuilder {
    /// Creates a query for the given name and record type.
    pub fn new(qname: &Name, rtype: Rtype) -> Self {
        let mut target = vec![0u8; 2];
        let mut header = Header::new();
        header.set_rd(true);
        header.set_qdcount(1);
        target.extend_from_slice(header.as_slice());
        target.extend_from_slice(qname.as_wire_slice());
        target.extend_from_slice(&rtype.to_int().to_be_bytes());
        target.extend_from_slice(&Class::In.to_int().to_be_bytes());
        // A name is at most 255 octets, so the length always fits.
        let len = (target.len() - 2) as u16;
        target[..2].copy_from_slice(&len.to_be_bytes());
        QueryBuilder { target }
    }

    /// Returns the message octets including the stream framing length.
    pub fn as_stream_slice(&self) -> &[u8] {
        &self.target
    }

    /// Returns the message octets without the stream framing length.
    pub fn as_dgram_slice(&self) -> &[u8] {
        &self.target[2..]
    }
}

//============ Testing =======================================================
