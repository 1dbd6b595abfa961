//! IANA definitions for the record types and classes in use.

use std::fmt;

//------------ Rtype ---------------------------------------------------------

/// The record types understood by the resolver.
///
/// The enum is deliberately closed: a query can only ever be constructed
/// for one of these types. Record types outside this set that appear in a
/// response are carried as their raw integer value by
/// [`RecordData::Unknown`][crate::rdata::RecordData::Unknown].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rtype {
    /// A host address. [RFC 1035]
    ///
    /// [RFC 1035]: https://tools.ietf.org/html/rfc1035
    A,

    /// An authoritative name server.
    Ns,

    /// The canonical name for an alias.
    Cname,

    /// A domain name pointer.
    Ptr,

    /// Mail exchange.
    Mx,

    /// Text strings.
    Txt,
}

impl Rtype {
    /// Returns the wire-format integer value of the type.
    pub fn to_int(self) -> u16 {
        match self {
            Rtype::A => 1,
            Rtype::Ns => 2,
            Rtype::Cname => 5,
            Rtype::Ptr => 12,
            Rtype::Mx => 15,
            Rtype::Txt => 16,
        }
    }

    /// Returns the type for a wire-format integer value if it is supported.
    pub fn from_int(value: u16) -> Option<Self> {
        match value {
            1 => Some(Rtype::A),
            2 => Some(Rtype::Ns),
            5 => Some(Rtype::Cname),
            12 => Some(Rtype::Ptr),
            15 => Some(Rtype::Mx),
            16 => Some(Rtype::Txt),
            _ => None,
        }
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Rtype::A => "A",
            Rtype::Ns => "NS",
            Rtype::Cname => "CNAME",
            Rtype::Ptr => "PTR",
            Rtype::Mx => "MX",
            Rtype::Txt => "TXT",
        })
    }
}

//------------ Class ---------------------------------------------------------

/// The record classes understood by the resolver.
///
/// Only the Internet class is supported.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The Internet class.
    In,
}

impl Class {
    /// Returns the wire-format integer value of the class.
    pub fn to_int(self) -> u16 {
        match self {
            Class::In => 1,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::In => f.write_str("IN"),
        }
    }
}

//============ Testing =======================================================
