//! The header of a DNS message.
//!
//! Every DNS message starts with the same twelve octets: a message ID,
//! two octets worth of flags, and the entry counts of the four message
//! sections. [`Header`] wraps those octets and provides typed access to
//! the fields this crate cares about.

use super::parse::{ParseError, Parser};

//------------ Header --------------------------------------------------------

/// The fixed header of a DNS message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The wire format of the header.
    data: [u8; 12],
}

impl Header {
    /// Creates a new header with all fields zero.
    ///
    /// A zeroed header describes a query with ID 0, which is what this
    /// resolver sends: with one query per TCP connection there is nothing
    /// for the ID to disambiguate.
    pub fn new() -> Self {
        Header::default()
    }

    /// Returns the wire format octets of the header.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Takes a header from the beginning of a message.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let octets = parser.parse_octets(12)?;
        let mut data = [0u8; 12];
        data.copy_from_slice(octets);
        Ok(Header { data })
    }

    /// Returns the message ID.
    pub fn id(&self) -> u16 {
        self.get_u16(0)
    }

    /// Returns whether the message is a response.
    pub fn qr(&self) -> bool {
        self.data[2] & 0x80 != 0
    }

    /// Returns whether recursion is desired.
    pub fn rd(&self) -> bool {
        self.data[2] & 0x01 != 0
    }

    /// Sets whether recursion is desired.
    pub fn set_rd(&mut self, set: bool) {
        if set {
            self.data[2] |= 0x01;
        } else {
            self.data[2] &= !0x01;
        }
    }

    /// Returns the response code of the message.
    pub fn rcode(&self) -> u8 {
        self.data[3] & 0x0F
    }

    /// Returns the number of entries in the question section.
    pub fn qdcount(&self) -> u16 {
        self.get_u16(4)
    }

    /// Sets the number of entries in the question section.
    pub fn set_qdcount(&mut self, count: u16) {
        self.set_u16(4, count)
    }

    /// Returns the number of entries in the answer section.
    pub fn ancount(&self) -> u16 {
        self.get_u16(6)
    }

    /// Returns the number of entries in the authority section.
    pub fn nscount(&self) -> u16 {
        self.get_u16(8)
    }

    /// Returns the number of entries in the additional section.
    pub fn arcount(&self) -> u16 {
        self.get_u16(10)
    }

    fn get_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn set_u16(&mut self, offset: usize, value: u16) {
        self.data[offset..offset + 2]
            .copy_from_slice(&value.to_be_bytes())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_and_counts() {
        let mut header = Header::new();
        assert_eq!(header.id(), 0);
        assert!(!header.rd());
        header.set_rd(true);
        assert!(header.rd());
        assert_eq!(header.as_slice()[2], 0x01);
        header.set_qdcount(1);
        assert_eq!(header.qdcount(), 1);
        assert_eq!(
            header.as_slice(),
            b"\x00\x00\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00"
        );
    }

    #[test]
    fn parse() {
        let data = b"\xd3\x88\x81\x80\x00\x01\x00\x02\x00\x03\x00\x04tail";
        let mut parser = Parser::from_ref(data);
        let header = Header::parse(&mut parser).unwrap();
        assert_eq!(header.id(), 0xd388);
        assert!(header.qr());
        assert!(header.rd());
        assert_eq!(header.rcode(), 0);
        assert_eq!(header.qdcount(), 1);
        assert_eq!(header.ancount(), 2);
        assert_eq!(header.nscount(), 3);
        assert_eq!(header.arcount(), 4);
        assert_eq!(parser.parse_octets(4).unwrap(), b"tail");
    }
}
