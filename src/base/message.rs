//! Accessing an existing DNS message.
//!
//! A response received from a server is handed to [`Message::from_octets`]
//! which checks the header for sanity and parses all sections eagerly. The
//! entire message has to be well-formed up to the record level; the data of
//! records with unsupported types is skipped but their presence is kept.

use bytes::Bytes;

use crate::rdata::RecordData;

use super::header::Header;
use super::name::Name;
use super::parse::{FormError, ParseError, Parser};
use super::question::Question;

/// The highest accepted entry count of a single record section.
///
/// A legitimate response to the kind of query this resolver sends never
/// comes anywhere near this; a larger count is taken as a sign of a
/// nonsensical or hostile message.
const MAX_SECTION_COUNT: u16 = 128;

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// All four sections are parsed when the message is created; the accessor
/// methods merely hand out references.
#[derive(Clone, Debug)]
pub struct Message {
    /// The message header.
    header: Header,

    /// The entries of the question section.
    questions: Vec<Question>,

    /// The records of the answer section.
    answer: Vec<Record>,

    /// The records of the authority section.
    authority: Vec<Record>,

    /// The records of the additional section.
    additional: Vec<Record>,
}

impl Message {
    /// Creates a message from the octets of its wire format.
    ///
    /// The octets must not include the two octet stream framing length.
    ///
    /// Fails if the message is too short, if any name or record is
    /// malformed, if the question count isn't exactly one, or if any
    /// record section claims more than [`MAX_SECTION_COUNT`] entries.
    pub fn from_octets(octets: Bytes) -> Result<Self, ParseError> {
        let mut parser = Parser::from_ref(octets.as_ref());
        let header = Header::parse(&mut parser)?;
        if header.qdcount() != 1 {
            return Err(
                FormError::new("question count not exactly one").into()
            );
        }
        for count in
            [header.ancount(), header.nscount(), header.arcount()]
        {
            if count > MAX_SECTION_COUNT {
                return Err(
                    FormError::new("excessive section count").into()
                );
            }
        }
        let mut questions = Vec::with_capacity(header.qdcount().into());
        for _ in 0..header.qdcount() {
            questions.push(Question::parse(&mut parser)?);
        }
        let answer = Self::parse_section(&mut parser, header.ancount())?;
        let authority = Self::parse_section(&mut parser, header.nscount())?;
        let additional =
            Self::parse_section(&mut parser, header.arcount())?;
        Ok(Message {
            header,
            questions,
            answer,
            authority,
            additional,
        })
    }

    fn parse_section(
        parser: &mut Parser,
        count: u16,
    ) -> Result<Vec<Record>, ParseError> {
        let mut records = Vec::with_capacity(count.into());
        for _ in 0..count {
            records.push(Record::parse(parser)?);
        }
        Ok(records)
    }

    /// Returns the message header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the single entry of the question section.
    pub fn question(&self) -> &Question {
        // `from_octets` refuses messages whose question count isn't one.
        &self.questions[0]
    }

    /// Returns the records of the answer section.
    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    /// Returns the records of the authority section.
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    /// Returns the records of the additional section.
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }
}

//------------ Record --------------------------------------------------------

/// A resource record of a DNS message.
#[derive(Clone, Debug)]
pub struct Record {
    /// The name of the node to which the record pertains.
    name: Name,

    /// The record type in its raw integer form.
    rtype: u16,

    /// The record class in its raw integer form.
    class: u16,

    /// The number of seconds the record may be cached.
    ///
    /// Kept as the opaque four octet value from the wire; this resolver
    /// does not cache and never interprets it.
    ttl: u32,

    /// The data of the record.
    data: RecordData,
}

impl Record {
    /// Returns the owner name of the record.
    pub fn owner(&self) -> &Name {
        &self.name
    }

    /// Returns the raw integer value of the record type.
    pub fn rtype(&self) -> u16 {
        self.rtype
    }

    /// Returns the raw integer value of the record class.
    pub fn class(&self) -> u16 {
        self.class
    }

    /// Returns the TTL of the record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns a reference to the record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Converts the record into its data.
    pub fn into_data(self) -> RecordData {
        self.data
    }

    /// Takes a record from the beginning of a message section.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let name = Name::parse(parser)?;
        let rtype = parser.parse_u16()?;
        let class = parser.parse_u16()?;
        let ttl = parser.parse_u32()?;
        let rdlen = usize::from(parser.parse_u16()?);
        let data = RecordData::parse(rtype, rdlen, parser)?;
        Ok(Record {
            name,
            rtype,
            class,
            ttl,
            data,
        })
    }
}

//============ Testing =======================================================
