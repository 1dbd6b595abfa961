//! The stub resolver.
//!
//! This module contains the type [`StubResolver`] that represents a
//! resolver. It sends queries over TCP to the recursive servers from its
//! configuration and hands back the records from the response.
//!
//! One lookup is driven by a [`Query`] value holding the lookup's own view
//! of the server pool. Two nested loops shape its life:
//!
//! * The outer loop fails over between the configured servers. A server
//!   whose connection attempt fails is marked dead for this lookup and the
//!   next one is tried; running out of servers ends the lookup.
//! * The inner loop follows delegations. A response without answers but
//!   with an NS record in its authority section naming a different server
//!   sends the query on to that server directly, at most ten times per
//!   lookup.
//!
//! A response that answers the question, or offers neither answers nor a
//! usable delegation, terminates the lookup and is handed to the caller
//! as an [`Answer`].

pub mod conf;
pub mod net;

use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::ops;
use std::sync::Arc;

use tracing::debug;

use crate::base::iana::Rtype;
use crate::base::message::Message;
use crate::base::message_builder::QueryBuilder;
use crate::base::name::Name;
use crate::lookup::addr::{lookup_addr, FoundAddrs};
use crate::lookup::host::{lookup_host, FoundHosts};
use crate::rdata::RecordData;

use self::conf::{ResolvConf, ResolvOptions, ServerConf};
use self::net::{exchange, ExchangeError, ServerList};

/// The highest number of NS referrals followed within one lookup.
const MAX_HOPS: usize = 10;

//------------ StubResolver --------------------------------------------------

/// A DNS stub resolver.
///
/// The resolver itself only holds configuration; each lookup works on its
/// own copy of the server pool. Resolver values can therefore be cloned
/// cheaply and shared freely: they keep their information behind an arc
/// and lookups running concurrently never disturb each other.
#[derive(Clone, Debug, Default)]
pub struct StubResolver(Arc<ResolverInner>);

#[derive(Debug, Default)]
struct ResolverInner {
    /// The resolver configuration.
    conf: ResolvConf,
}

impl StubResolver {
    /// Creates a new resolver using the default configuration.
    pub fn new() -> Self {
        Self::from_conf(ResolvConf::default())
    }

    /// Creates a new resolver using the given configuration.
    pub fn from_conf(conf: ResolvConf) -> Self {
        StubResolver(Arc::new(ResolverInner { conf }))
    }

    /// Returns the resolver's configuration.
    pub fn conf(&self) -> &ResolvConf {
        &self.0.conf
    }

    /// Returns the resolver's options.
    pub fn options(&self) -> &ResolvOptions {
        &self.0.conf.options
    }

    /// Performs a lookup and returns the final answer message.
    ///
    /// Drives the full state machine, server failover and referral
    /// chasing included. The returned answer either carries answer records
    /// or states that there is no data for the question.
    pub async fn query(
        &self,
        qname: &Name,
        rtype: Rtype,
    ) -> Result<Answer, QueryError> {
        Query::new(self.clone()).run(qname, rtype).await
    }

    /// Performs a lookup and extracts the records of the queried type.
    ///
    /// Returns `None` if the lookup ended without data, i.e., the servers
    /// neither answered the question nor pointed anywhere else. Otherwise
    /// returns the record data of the requested type from the answer;
    /// CNAME records in the answer are skipped, and MX records have their
    /// glue addresses attached from the additional section.
    pub async fn resolve(
        &self,
        qname: &Name,
        rtype: Rtype,
    ) -> Result<Option<Vec<RecordData>>, QueryError> {
        let answer = self.query(qname, rtype).await?;
        if answer.header().ancount() == 0 {
            return Ok(None);
        }
        answer.records(rtype).map(Some)
    }

    /// Looks up the IPv4 addresses of a host name.
    pub async fn lookup_host(
        &self,
        qname: &Name,
    ) -> Result<FoundHosts, QueryError> {
        lookup_host(self, qname).await
    }

    /// Looks up the host names of an address, forward-confirmed.
    pub async fn lookup_addr(
        &self,
        addr: Ipv4Addr,
    ) -> Result<Option<FoundAddrs>, QueryError> {
        lookup_addr(self, addr).await
    }
}

//------------ Query ---------------------------------------------------------

/// The state of a single lookup.
struct Query {
    /// The resolver whose configuration we are using.
    resolver: StubResolver,

    /// This lookup's view of the server pool.
    ///
    /// Starts as a copy of the configured pool; becomes a single
    /// designated server while following a referral.
    servers: ServerList,

    /// The number of referrals followed so far.
    hops: usize,

    /// The most recent transport error, kept for error reporting.
    ///
    /// If the pool consists of a single server, its transport failure is
    /// surfaced verbatim; with more servers, failures are consumed by
    /// failover and exhaustion reports [`QueryError::NoServerAlive`].
    last_error: Option<(ServerConf, ExchangeError)>,
}

impl Query {
    fn new(resolver: StubResolver) -> Self {
        let servers = ServerList::from_conf(resolver.conf());
        Query {
            resolver,
            servers,
            hops: 0,
            last_error: None,
        }
    }

    async fn run(
        mut self,
        qname: &Name,
        rtype: Rtype,
    ) -> Result<Answer, QueryError> {
        let query = QueryBuilder::new(qname, rtype);
        loop {
            let (server, message) = self.exchange_message(&query).await?;
            let answer = Answer::from(message);
            if answer.header().ancount() > 0 {
                if self.resolver.options().debug {
                    debug!(
                        "{} {}: {} answer records from {}",
                        qname,
                        rtype,
                        answer.header().ancount(),
                        server
                    );
                }
                return Ok(answer);
            }
            match answer.referral(&server) {
                Some(target) => {
                    if self.hops >= MAX_HOPS {
                        return Err(QueryError::TooManyHops);
                    }
                    self.hops += 1;
                    debug!(
                        "{} {}: referred to {} (hop {})",
                        qname, rtype, target, self.hops
                    );
                    self.servers = ServerList::single(
                        ServerConf::with_port(
                            target.to_string(),
                            self.resolver.options().referral_port,
                        ),
                    );
                    self.last_error = None;
                }
                None => {
                    if self.resolver.options().debug {
                        debug!("{} {}: no data from {}", qname, rtype, server);
                    }
                    return Ok(answer);
                }
            }
        }
    }

    /// Sends the query to the first alive server, failing over on error.
    async fn exchange_message(
        &mut self,
        query: &QueryBuilder,
    ) -> Result<(ServerConf, Message), QueryError> {
        loop {
            let idx = match self.servers.first_alive() {
                Some(idx) => idx,
                None => return Err(self.exhausted()),
            };
            let server = self.servers.conf(idx).clone();
            let timeout = self.resolver.options().timeout_connect;
            match exchange(&server, query, timeout).await {
                Ok(octets) => {
                    let message = Message::from_octets(octets)
                        .map_err(|err| {
                            debug!("malformed response from {}: {}",
                                server, err);
                            QueryError::InvalidResponse
                        })?;
                    return Ok((server, message));
                }
                Err(ExchangeError::Incomplete) => {
                    return Err(QueryError::IncompleteResponse(server));
                }
                Err(err) => {
                    debug!("marking {} dead: {}", server, err);
                    self.servers.mark_dead(idx);
                    self.last_error = Some((server, err));
                }
            }
        }
    }

    /// Produces the error reported when the pool has run dry.
    fn exhausted(&mut self) -> QueryError {
        if self.servers.len() == 1 {
            if let Some((server, err)) = self.last_error.take() {
                return match err {
                    ExchangeError::ConnectionRefused => {
                        QueryError::ConnectionRefused(server)
                    }
                    ExchangeError::Timeout => QueryError::Timeout(server),
                    ExchangeError::Incomplete => {
                        QueryError::IncompleteResponse(server)
                    }
                    ExchangeError::Other(kind) => {
                        QueryError::ServerError(server, kind)
                    }
                };
            }
        }
        QueryError::NoServerAlive
    }
}

//------------ Answer --------------------------------------------------------

/// The answer to a question.
///
/// This type is a wrapper around the DNS [`Message`] containing the answer
/// that provides the record extraction the resolver applies on delivery.
#[derive(Clone, Debug)]
pub struct Answer {
    message: Message,
}

impl Answer {
    /// Extracts the record data of the requested type.
    ///
    /// CNAME records in the answer section are skipped. MX records get
    /// their glue addresses attached from matching A records in the
    /// additional section. A record of an unsupported type in the answer
    /// section invalidates the whole response.
    pub fn records(
        &self,
        rtype: Rtype,
    ) -> Result<Vec<RecordData>, QueryError> {
        let mut records = Vec::new();
        for record in self.message.answer() {
            match *record.data() {
                RecordData::Cname if rtype != Rtype::Cname => {
                    debug!("skipping CNAME record for {}", record.owner());
                }
                RecordData::Unknown(value) => {
                    debug!(
                        "record type {} in answer section of {}",
                        value,
                        record.owner()
                    );
                    return Err(QueryError::InvalidResponse);
                }
                ref data if data.rtype() == Some(rtype) => {
                    let mut data = data.clone();
                    if let RecordData::Mx(ref mut mx) = data {
                        mx.addresses = self.glue_for(&mx.exchange);
                    }
                    records.push(data);
                }
                _ => {}
            }
        }
        Ok(records)
    }

    /// Returns the target of an NS referral, if the answer carries one.
    ///
    /// A referral is an NS record in the authority section whose server
    /// name differs from the server the response came from, since a server
    /// naming itself would just be chased in circles.
    fn referral(&self, server: &ServerConf) -> Option<Name> {
        let host = server.host.trim_end_matches('.');
        self.message
            .authority()
            .iter()
            .filter_map(|record| match *record.data() {
                RecordData::Ns(ref name) => Some(name),
                _ => None,
            })
            .find(|name| !name.to_string().eq_ignore_ascii_case(host))
            .cloned()
    }

    /// Returns the glue addresses for a mail exchange host.
    fn glue_for(&self, exchange: &Name) -> Option<Vec<Ipv4Addr>> {
        let addrs: Vec<Ipv4Addr> = self
            .message
            .additional()
            .iter()
            .filter(|record| record.owner() == exchange)
            .filter_map(|record| match *record.data() {
                RecordData::A(addr) => Some(addr),
                _ => None,
            })
            .collect();
        if addrs.is_empty() {
            None
        } else {
            Some(addrs)
        }
    }

    /// Converts the answer into the underlying message.
    pub fn into_message(self) -> Message {
        self.message
    }
}

impl From<Message> for Answer {
    fn from(message: Message) -> Self {
        Answer { message }
    }
}

impl ops::Deref for Answer {
    type Target = Message;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl AsRef<Message> for Answer {
    fn as_ref(&self) -> &Message {
        &self.message
    }
}

//------------ QueryError ----------------------------------------------------

/// A lookup failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryError {
    /// All servers of the pool failed during this lookup.
    NoServerAlive,

    /// The only server of the pool refused the connection.
    ConnectionRefused(ServerConf),

    /// The only server of the pool did not accept a connection in time.
    Timeout(ServerConf),

    /// The only server of the pool failed with another I/O error.
    ServerError(ServerConf, io::ErrorKind),

    /// A server closed the connection before the full response arrived.
    IncompleteResponse(ServerConf),

    /// The lookup was referred more than the allowed number of times.
    TooManyHops,

    /// A response could not be understood.
    InvalidResponse,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::NoServerAlive => {
                f.write_str("no name server alive")
            }
            QueryError::ConnectionRefused(ref server) => {
                write!(f, "connection refused by {}", server)
            }
            QueryError::Timeout(ref server) => {
                write!(f, "timeout connecting to {}", server)
            }
            QueryError::ServerError(ref server, kind) => {
                write!(f, "error talking to {}: {}", server, kind)
            }
            QueryError::IncompleteResponse(ref server) => {
                write!(f, "incomplete response from {}", server)
            }
            QueryError::TooManyHops => f.write_str("too many referrals"),
            QueryError::InvalidResponse => {
                f.write_str("invalid response")
            }
        }
    }
}

impl std::error::Error for QueryError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;

    /// A response with one MX answer and one glue A record.
    fn mx_response() -> Answer {
        let octets = Bytes::from_static(
            b"\x00\x00\x81\x80\x00\x01\x00\x01\x00\x00\x00\x01\
              \x07example\x03org\x00\x00\x0f\x00\x01\
              \xc0\x0c\x00\x0f\x00\x01\x00\x00\x0e\x10\x00\x07\
              \x00\x0a\x02mx\xc0\x0c\
              \x02mx\xc0\x0c\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\
              \x01\x02\x03\x04",
        );
        Answer::from(Message::from_octets(octets).unwrap())
    }

    #[test]
    fn mx_records_pick_up_glue() {
        let answer = mx_response();
        let records = answer.records(Rtype::Mx).unwrap();
        assert_eq!(records.len(), 1);
        match records[0] {
            RecordData::Mx(ref mx) => {
                assert_eq!(mx.preference, 10);
                assert_eq!(mx.exchange.to_string(), "mx.example.org");
                assert_eq!(
                    mx.addresses,
                    Some(vec![Ipv4Addr::new(1, 2, 3, 4)])
                );
            }
            ref other => panic!("expected MX, got {:?}", other),
        }
    }

    /// A response whose answer mixes a CNAME with an A record.
    fn cname_and_a_response() -> Answer {
        let octets = Bytes::from_static(
            b"\x00\x00\x81\x80\x00\x01\x00\x02\x00\x00\x00\x00\
              \x03www\x07example\x03com\x00\x00\x01\x00\x01\
              \xc0\x0c\x00\x05\x00\x01\x00\x00\x0e\x10\x00\x02\xc0\x10\
              \xc0\x0c\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\
              \x5d\xb8\xd8\x22",
        );
        Answer::from(Message::from_octets(octets).unwrap())
    }

    #[test]
    fn cname_records_are_skipped() {
        let answer = cname_and_a_response();
        let records = answer.records(Rtype::A).unwrap();
        assert_eq!(
            records,
            vec![RecordData::A(Ipv4Addr::new(93, 184, 216, 34))]
        );
    }

    /// A response with an unsupported record type in the answer section.
    fn unknown_in_answer_response() -> Answer {
        let octets = Bytes::from_static(
            b"\x00\x00\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
              \x07example\x03com\x00\x00\x01\x00\x01\
              \xc0\x0c\x00\x1c\x00\x01\x00\x00\x0e\x10\x00\x10\
              \x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x01",
        );
        Answer::from(Message::from_octets(octets).unwrap())
    }

    #[test]
    fn unknown_type_in_answer_is_invalid() {
        let answer = unknown_in_answer_response();
        assert_eq!(
            answer.records(Rtype::A),
            Err(QueryError::InvalidResponse)
        );
    }

    /// A referral response delegating example.com to ns.sub.example.
    fn referral_response() -> Answer {
        let octets = Bytes::from_static(
            b"\x00\x00\x81\x80\x00\x01\x00\x00\x00\x01\x00\x00\
              \x07example\x03com\x00\x00\x01\x00\x01\
              \xc0\x0c\x00\x02\x00\x01\x00\x00\x0e\x10\x00\x10\
              \x02ns\x03sub\x07example\x00",
        );
        Answer::from(Message::from_octets(octets).unwrap())
    }

    #[test]
    fn referral_skips_the_current_server() {
        let answer = referral_response();
        assert_eq!(
            answer
                .referral(&ServerConf::new("192.0.2.1"))
                .map(|name| name.to_string()),
            Some("ns.sub.example".into())
        );
        // The server naming itself is not a referral.
        assert_eq!(
            answer.referral(&ServerConf::new("ns.sub.example")),
            None
        );
    }
}
