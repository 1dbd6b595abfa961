//! Lookup functions built on top of the resolver.
//!
//! The functions in this module answer higher-level questions by composing
//! one or more resolver queries: [`lookup_host`][host::lookup_host] maps a
//! host name to its addresses, and [`lookup_addr`][addr::lookup_addr] maps
//! an address back to host names, accepting only names whose forward
//! lookup confirms the address.

pub mod addr;
pub mod host;

pub use self::addr::{lookup_addr, FoundAddrs};
pub use self::host::{lookup_host, FoundHosts};
