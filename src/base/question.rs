//! A question putting a query to a resolver.

use std::fmt;

use super::iana::Rtype;
use super::name::Name;
use super::parse::{ParseError, Parser};

//------------ Question ------------------------------------------------------

/// An entry of the question section of a DNS message.
///
/// The type and class are kept in their raw integer form since a response
/// echoes whatever the query carried.
#[derive(Clone, Debug)]
pub struct Question {
    /// The name of the node for which records are requested.
    qname: Name,

    /// The type of records that are requested.
    qtype: u16,

    /// The requested class.
    qclass: u16,
}

impl Question {
    /// Returns the requested name.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the raw integer value of the requested record type.
    pub fn qtype(&self) -> u16 {
        self.qtype
    }

    /// Returns the requested record type if it is supported.
    pub fn rtype(&self) -> Option<Rtype> {
        Rtype::from_int(self.qtype)
    }

    /// Returns the raw integer value of the requested class.
    pub fn qclass(&self) -> u16 {
        self.qclass
    }

    /// Takes a question from the beginning of a message section.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let qname = Name::parse(parser)?;
        let qtype = parser.parse_u16()?;
        let qclass = parser.parse_u16()?;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }
}

//--- Display

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rtype() {
            Some(rtype) => write!(f, "{} {}", self.qname, rtype),
            None => write!(f, "{} TYPE{}", self.qname, self.qtype),
        }
    }
}
