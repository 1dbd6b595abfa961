//! The server pool and the TCP transport.
//!
//! [`ServerList`] is a lookup's private view of the configured servers.
//! Every lookup clones the effective server list into its own
//! [`ServerList`] so the liveness flags it flips while failing over can
//! never leak into a concurrently running lookup.
//!
//! [`exchange`] performs one framed query/response round trip over a fresh
//! TCP connection. There is no pipelining, no connection reuse, and no
//! retry once the connection has been established.

use std::fmt;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::base::message_builder::QueryBuilder;

use super::conf::{ResolvConf, ServerConf};

//------------ ServerInfo ----------------------------------------------------

/// A server entry of a lookup's pool view.
#[derive(Clone, Debug)]
pub struct ServerInfo {
    /// The basic server configuration.
    conf: ServerConf,

    /// Whether this server is still considered for this lookup.
    ///
    /// Scratch state of a single lookup: the flag starts out set and is
    /// cleared when a connection attempt to the server fails.
    alive: bool,
}

impl ServerInfo {
    /// Returns the server's configuration.
    pub fn conf(&self) -> &ServerConf {
        &self.conf
    }

    /// Returns whether the server is still considered for this lookup.
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl From<ServerConf> for ServerInfo {
    fn from(conf: ServerConf) -> Self {
        ServerInfo { conf, alive: true }
    }
}

//------------ ServerList ----------------------------------------------------

/// A lookup-local list of servers with their liveness state.
///
/// The order of the entries is their priority: selection always returns
/// the first entry still alive.
#[derive(Clone, Debug)]
pub struct ServerList {
    /// The actual list of servers.
    servers: Vec<ServerInfo>,
}

impl ServerList {
    /// Creates a server list from a configuration's effective servers.
    pub fn from_conf(conf: &ResolvConf) -> Self {
        ServerList {
            servers: conf
                .effective_servers()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }

    /// Creates a server list holding a single designated server.
    pub fn single(conf: ServerConf) -> Self {
        ServerList {
            servers: vec![conf.into()],
        }
    }

    /// Returns the number of servers in the list, dead or alive.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Returns the index of the first server still alive.
    pub fn first_alive(&self) -> Option<usize> {
        self.servers.iter().position(ServerInfo::is_alive)
    }

    /// Returns the configuration of the server at `idx`.
    pub fn conf(&self, idx: usize) -> &ServerConf {
        &self.servers[idx].conf
    }

    /// Takes the server at `idx` out of consideration for this lookup.
    pub fn mark_dead(&mut self, idx: usize) {
        self.servers[idx].alive = false;
    }
}

//------------ exchange ------------------------------------------------------

/// Performs a single query/response exchange with a server.
///
/// Connects to the server, bounded by `connect_timeout`, writes the
/// framed query once, and reads until either enough octets for the framed
/// response have arrived or the server closes the connection. The returned
/// octets are the bare message without the framing length.
pub async fn exchange(
    server: &ServerConf,
    query: &QueryBuilder,
    connect_timeout: Duration,
) -> Result<Bytes, ExchangeError> {
    let addr = (server.host.as_str(), server.port);
    let mut stream = match timeout(
        connect_timeout,
        TcpStream::connect(addr),
    )
    .await
    {
        Err(_) => return Err(ExchangeError::Timeout),
        Ok(Err(err)) if err.kind() == io::ErrorKind::ConnectionRefused => {
            return Err(ExchangeError::ConnectionRefused)
        }
        Ok(Err(err)) => return Err(ExchangeError::Other(err.kind())),
        Ok(Ok(stream)) => stream,
    };
    trace!("connected to {}", server);

    stream
        .write_all(query.as_stream_slice())
        .await
        .map_err(|err| ExchangeError::Other(err.kind()))?;

    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 2048];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|err| ExchangeError::Other(err.kind()))?;
        if n == 0 {
            // The server closed the connection before the message was
            // complete.
            return Err(ExchangeError::Incomplete);
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= 2 {
            let msglen = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
            if buf.len() >= msglen + 2 {
                trace!("received {} octets from {}", msglen, server);
                return Ok(Bytes::from(buf).slice(2..msglen + 2));
            }
        }
    }
}

//------------ ExchangeError -------------------------------------------------

/// An error happened during a query/response exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExchangeError {
    /// The server refused the connection.
    ConnectionRefused,

    /// The connection attempt did not finish within the connect timeout.
    Timeout,

    /// The connection was closed before the full response arrived.
    Incomplete,

    /// Any other I/O error.
    Other(io::ErrorKind),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExchangeError::ConnectionRefused => {
                f.write_str("connection refused")
            }
            ExchangeError::Timeout => f.write_str("connect timed out"),
            ExchangeError::Incomplete => {
                f.write_str("incomplete response")
            }
            ExchangeError::Other(kind) => kind.fmt(f),
        }
    }
}

impl std::error::Error for ExchangeError {}

//============ Testing =======================================================
