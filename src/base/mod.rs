//! The wire-format foundation.
//!
//! This module collects the types needed to construct DNS query messages
//! and pick apart the responses: [`Parser`][parse::Parser] as the cursor
//! over raw message bytes, [`Name`][name::Name] for domain names including
//! the compression scheme, [`Header`][header::Header] for the fixed twelve
//! byte message header, [`Message`][message::Message] for a fully parsed
//! response, and [`QueryBuilder`][message_builder::QueryBuilder] for
//! building a stream-framed query.

pub mod header;
pub mod iana;
pub mod message;
pub mod message_builder;
pub mod name;
pub mod parse;
pub mod question;

pub use self::header::Header;
pub use self::message::{Message, Record};
pub use self::message_builder::QueryBuilder;
pub use self::name::Name;
pub use self::question::Question;
