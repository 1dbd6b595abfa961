//! A stub and iterative DNS resolver for Rust.
//!
//! This crate implements the client side of the DNS protocol over TCP. It
//! sends a query to a pool of configured recursive name servers, failing
//! over between them, and, when a server declines to answer but offers a
//! delegation, follows NS referrals up to a bounded depth. On top of that
//! it provides forward-confirmed reverse lookups.
//!
//! The crate is organised into a small number of modules:
//!
//! * [base] contains the wire-format foundation: domain names, the message
//!   header, and parsing and constructing DNS messages,
//! * [rdata] contains the record data types understood by the resolver,
//! * [stub] contains the resolver itself together with its configuration
//!   and the TCP transport, and
//! * [lookup] contains lookup functions built on top of the resolver.
//!
//! The usual entry point is [`StubResolver`]. Create one from a
//! [`ResolvConf`], then use [`resolve`][StubResolver::resolve] or one of
//! the lookup functions:
//!
//! ```no_run
//! use stub_resolv::base::iana::Rtype;
//! use stub_resolv::base::name::Name;
//! use stub_resolv::StubResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = StubResolver::new();
//! let name: Name = "www.example.com".parse()?;
//! if let Some(records) = resolver.resolve(&name, Rtype::A).await? {
//!     for record in records {
//!         println!("{}", record);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All I/O is asynchronous and driven by the Tokio runtime. Queries use
//! TCP exclusively with RFC 1035 length framing; each query gets its own
//! connection which is closed when the exchange completes.

pub mod base;
pub mod lookup;
pub mod rdata;
pub mod stub;

pub use crate::stub::conf::ResolvConf;
pub use crate::stub::{Answer, QueryError, StubResolver};
