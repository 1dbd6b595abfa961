//! Record data.
//!
//! This module contains the data of the resource record types the resolver
//! understands. [`RecordData`] keeps the data of one record as a variant
//! per type; records of any other type are carried as
//! [`Unknown`][RecordData::Unknown] with their raw type value so callers
//! can decide how to treat them.

use std::fmt;
use std::net::Ipv4Addr;

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::parse::{FormError, ParseError, Parser};

/// The highest number of character strings read from a single TXT record.
const TXT_FRAGMENT_LIMIT: usize = 10;

//------------ RecordData ----------------------------------------------------

/// The data of a resource record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordData {
    /// The IPv4 address of an A record.
    A(Ipv4Addr),

    /// The server name of an NS record.
    Ns(Name),

    /// A CNAME record.
    ///
    /// Only the fact that the record is a CNAME is kept; the alias target
    /// is discarded since the resolver does not follow CNAME chains.
    Cname,

    /// The target name of a PTR record.
    Ptr(Name),

    /// The data of an MX record.
    Mx(Mx),

    /// The concatenated character strings of a TXT record.
    Txt(Txt),

    /// A record of a type outside the supported set.
    ///
    /// Carries the raw record type. The record's data has been skipped.
    Unknown(u16),
}

impl RecordData {
    /// Takes the data of one record from a message.
    ///
    /// The parser has to be positioned at the start of the record data and
    /// will rest behind its end when the function returns, also when the
    /// data contains a compressed name that ends early or when the type is
    /// not supported.
    pub fn parse(
        rtype: u16,
        rdlen: usize,
        parser: &mut Parser,
    ) -> Result<Self, ParseError> {
        parser.check_len(rdlen)?;
        let end = parser.pos() + rdlen;
        let data = match Rtype::from_int(rtype) {
            Some(Rtype::A) => {
                if rdlen != 4 {
                    return Err(
                        FormError::new("invalid A record length").into()
                    );
                }
                let octets = parser.parse_octets(4)?;
                RecordData::A(Ipv4Addr::new(
                    octets[0], octets[1], octets[2], octets[3],
                ))
            }
            Some(Rtype::Ns) => {
                RecordData::Ns(parse_name_block(parser, end)?)
            }
            Some(Rtype::Cname) => RecordData::Cname,
            Some(Rtype::Ptr) => {
                RecordData::Ptr(parse_name_block(parser, end)?)
            }
            Some(Rtype::Mx) => RecordData::Mx(Mx::parse(parser, end)?),
            Some(Rtype::Txt) => RecordData::Txt(Txt::parse(parser, end)?),
            None => RecordData::Unknown(rtype),
        };
        parser.seek(end)?;
        Ok(data)
    }

    /// Returns the record type of the data if it is supported.
    pub fn rtype(&self) -> Option<Rtype> {
        match *self {
            RecordData::A(_) => Some(Rtype::A),
            RecordData::Ns(_) => Some(Rtype::Ns),
            RecordData::Cname => Some(Rtype::Cname),
            RecordData::Ptr(_) => Some(Rtype::Ptr),
            RecordData::Mx(_) => Some(Rtype::Mx),
            RecordData::Txt(_) => Some(Rtype::Txt),
            RecordData::Unknown(_) => None,
        }
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordData::A(addr) => addr.fmt(f),
            RecordData::Ns(ref name) => name.fmt(f),
            RecordData::Cname => f.write_str("CNAME"),
            RecordData::Ptr(ref name) => name.fmt(f),
            RecordData::Mx(ref mx) => mx.fmt(f),
            RecordData::Txt(ref txt) => txt.fmt(f),
            RecordData::Unknown(rtype) => write!(f, "TYPE{}", rtype),
        }
    }
}

//------------ Helper Functions ----------------------------------------------

/// Takes a name that has to stay within the current record's data.
///
/// A name in record data may use compression and thus end anywhere in the
/// message, but its in-place representation must not run past the end of
/// the record: a name crossing into the following record means the
/// declared RDLENGTH was a lie.
fn parse_name_block(
    parser: &mut Parser,
    end: usize,
) -> Result<Name, ParseError> {
    let name = Name::parse(parser)?;
    if parser.pos() > end {
        return Err(FormError::new("domain name exceeds record").into());
    }
    Ok(name)
}

//------------ Mx ------------------------------------------------------------

/// The data of an MX record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mx {
    /// The preference value of this mail exchange.
    ///
    /// A lower value means the exchange is to be preferred.
    pub preference: u16,

    /// The name of the host providing the mail exchange.
    pub exchange: Name,

    /// The addresses of the exchange host, if the response carried glue.
    ///
    /// Filled from A records in the additional section of the response
    /// whose owner matches [`exchange`][Self::exchange]; `None` if the
    /// response carried no matching glue.
    pub addresses: Option<Vec<Ipv4Addr>>,
}

impl Mx {
    fn parse(parser: &mut Parser, end: usize) -> Result<Self, ParseError> {
        let preference = parser.parse_u16()?;
        if parser.pos() > end {
            return Err(FormError::new("record data too short").into());
        }
        let exchange = parse_name_block(parser, end)?;
        Ok(Mx {
            preference,
            exchange,
            addresses: None,
        })
    }
}

//--- Display

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

//------------ Txt -----------------------------------------------------------

/// The data of a TXT record.
///
/// On the wire a TXT record carries one or more character strings, each
/// prefixed by its length. The strings are concatenated on parsing; at
/// most [`TXT_FRAGMENT_LIMIT`] of them are consumed from a single record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Txt {
    /// The concatenated content of the character strings.
    data: Vec<u8>,
}

impl Txt {
    /// Returns the concatenated text data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn parse(parser: &mut Parser, end: usize) -> Result<Self, ParseError> {
        let mut data = Vec::new();
        let mut fragments = 0;
        while parser.pos() < end && fragments < TXT_FRAGMENT_LIMIT {
            let len = usize::from(parser.parse_u8()?);
            if parser.pos() + len > end {
                return Err(
                    FormError::new("character string exceeds record").into()
                );
            }
            data.extend_from_slice(parser.parse_octets(len)?);
            fragments += 1;
        }
        Ok(Txt { data })
    }
}

impl From<Vec<u8>> for Txt {
    fn from(data: Vec<u8>) -> Self {
        Txt { data }
    }
}

//--- Display

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        String::from_utf8_lossy(&self.data).fmt(f)
    }
}

//============ Testing =======================================================
