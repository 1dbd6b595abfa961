//! Domain names.
//!
//! A domain name is a sequence of labels of between 1 and 63 octets each.
//! In the wire format every label is preceded by its length and the name is
//! terminated by a zero octet standing in for the empty root label; the
//! whole sequence must not exceed 255 octets. Messages may compress names:
//! wherever a label is expected, a two octet sequence whose top two bits
//! are both set instead carries a fourteen bit offset into the message at
//! which the name continues.
//!
//! [`Name`] stores a complete, uncompressed name in its wire format and
//! knows how to extract one from a message via [`Name::parse`], following
//! compression pointers with both a hop limit and the requirement that
//! every pointer leads strictly backwards.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::parse::{FormError, ParseError, Parser};

/// The highest number of compression pointers followed within one name.
const COMPRESS_LIMIT: usize = 20;

/// The maximum length of the wire format of a name.
const MAX_NAME_LEN: usize = 255;

/// The maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

//------------ Name ----------------------------------------------------------

/// An absolute domain name.
///
/// The name owns its uncompressed wire-format octets, terminating root
/// label included. Comparison and hashing treat ASCII letters case
/// insensitively as demanded by RFC 1035.
#[derive(Clone, Debug)]
pub struct Name {
    /// The wire format octets of the name.
    octets: Vec<u8>,
}

impl Name {
    /// Creates the name consisting of the root label only.
    pub fn root() -> Self {
        Name { octets: vec![0] }
    }

    /// Returns whether the name consists of the root label only.
    pub fn is_root(&self) -> bool {
        self.octets.len() == 1
    }

    /// Returns the wire format octets of the name.
    pub fn as_wire_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The final root label is not included.
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter {
            octets: &self.octets,
            pos: 0,
        }
    }

    /// Takes a name from the beginning of a message.
    ///
    /// The parser has to cover the entire message so compression pointers
    /// can be followed. After returning, the parser rests directly behind
    /// the name's in-place representation, i.e., behind the first pointer
    /// if the name was compressed.
    ///
    /// Two limits bound the traversal: at most [`COMPRESS_LIMIT`] pointers
    /// are followed, and every pointer has to target an offset strictly
    /// below the position of the pointer itself. The second rule alone
    /// guarantees termination; the first keeps adversarial chains cheap.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut octets = Vec::new();
        let mut return_pos = None;
        let mut hops = 0;
        loop {
            let head_pos = parser.pos();
            let head = parser.parse_u8()?;
            match head {
                0 => {
                    octets.push(0);
                    break;
                }
                1..=0x3F => {
                    let label = parser.parse_octets(head as usize)?;
                    if octets.len() + 1 + label.len() + 1 > MAX_NAME_LEN {
                        return Err(NameError::LongName.into());
                    }
                    octets.push(head);
                    octets.extend_from_slice(label);
                }
                0xC0..=0xFF => {
                    let target = (usize::from(head & 0x3F) << 8)
                        | usize::from(parser.parse_u8()?);
                    if target >= head_pos {
                        return Err(NameError::ForwardPointer.into());
                    }
                    hops += 1;
                    if hops > COMPRESS_LIMIT {
                        return Err(NameError::ExcessiveCompression.into());
                    }
                    if return_pos.is_none() {
                        return_pos = Some(parser.pos());
                    }
                    parser.seek(target)?;
                }
                _ => return Err(NameError::BadLabel.into()),
            }
        }
        if let Some(pos) = return_pos {
            parser.seek(pos)?;
        }
        Ok(Name { octets })
    }

    /// Skips over a name at the beginning of a message.
    ///
    /// In-place labels are walked over; a compression pointer ends the
    /// name without being followed.
    pub fn skip(parser: &mut Parser) -> Result<(), ParseError> {
        loop {
            let head = parser.parse_u8()?;
            match head {
                0 => return Ok(()),
                1..=0x3F => parser.advance(head as usize)?,
                0xC0..=0xFF => {
                    parser.advance(1)?;
                    return Ok(());
                }
                _ => return Err(NameError::BadLabel.into()),
            }
        }
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = FromStrError;

    /// Creates a name from its dotted textual representation.
    ///
    /// A single dot produces the root name. A trailing dot is accepted
    /// and ignored otherwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FromStrError::EmptyLabel);
        }
        if s == "." {
            return Ok(Name::root());
        }
        let s = s.strip_suffix('.').unwrap_or(s);
        let mut octets = Vec::with_capacity(s.len() + 2);
        for label in s.split('.') {
            if label.is_empty() {
                return Err(FromStrError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(FromStrError::LongLabel);
            }
            octets.push(label.len() as u8);
            octets.extend_from_slice(label.as_bytes());
        }
        octets.push(0);
        if octets.len() > MAX_NAME_LEN {
            return Err(FromStrError::LongName);
        }
        Ok(Name { octets })
    }
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        // Length octets are below 0x40 and thus unaffected by ASCII case
        // folding, so the raw wire octets can be compared wholesale.
        self.octets.eq_ignore_ascii_case(&other.octets)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in &self.octets {
            state.write_u8(ch.to_ascii_lowercase())
        }
    }
}

//--- Display

impl fmt::Display for Name {
    /// Formats the name in its common display format without the trailing
    /// dot. The root name is formatted as a single dot.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        let mut first = true;
        for label in self.labels() {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            for &ch in label {
                fmt::Write::write_char(f, char::from(ch))?;
            }
        }
        Ok(())
    }
}

//------------ LabelIter -----------------------------------------------------

/// An iterator over the labels of a name.
#[derive(Clone, Debug)]
pub struct LabelIter<'a> {
    octets: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(self.octets[self.pos]);
        if len == 0 {
            return None;
        }
        let start = self.pos + 1;
        self.pos = start + len;
        Some(&self.octets[start..self.pos])
    }
}

//------------ NameError -----------------------------------------------------

/// An error happened while parsing a name from a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name exceeds 255 octets.
    LongName,

    /// A label head was neither a length nor a compression pointer.
    BadLabel,

    /// A compression pointer did not lead strictly backwards.
    ForwardPointer,

    /// More than the allowed number of compression pointers.
    ExcessiveCompression,
}

impl From<NameError> for ParseError {
    fn from(err: NameError) -> Self {
        ParseError::Form(FormError::new(match err {
            NameError::LongName => "long domain name",
            NameError::BadLabel => "illegal label type",
            NameError::ForwardPointer => "compression pointer not backwards",
            NameError::ExcessiveCompression => "too many compression pointers",
        }))
    }
}

//------------ FromStrError --------------------------------------------------

/// An error happened while reading a name from its textual notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromStrError {
    /// An empty label was encountered.
    EmptyLabel,

    /// A label exceeds 63 characters.
    LongLabel,

    /// The name exceeds 255 octets.
    LongName,
}

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            FromStrError::EmptyLabel => "empty label",
            FromStrError::LongLabel => "label exceeds 63 characters",
            FromStrError::LongName => "name exceeds 255 characters",
        })
    }
}

impl std::error::Error for FromStrError {}

//============ Testing =======================================================
