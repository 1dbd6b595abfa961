//! Resolver configuration.
//!
//! [`ResolvConf`] collects everything the resolver needs to know before it
//! can send queries: which servers to talk to and a small set of options.
//! Servers come from two places: a user-supplied list and a list of
//! servers discovered from the operating system by the calling application.
//! Discovery itself is out of scope here; the discovered entries are simply
//! handed in via [`set_os_servers`][ResolvConf::set_os_servers]. The
//! effective pool is the concatenation of both lists with duplicates
//! removed, the user's entries first.
//!
//! All setters are idempotent: applying the same configuration value twice
//! leaves the configuration unchanged.

use std::fmt;
use std::time::Duration;

//------------ ServerConf ----------------------------------------------------

/// Configuration for one upstream DNS server.
///
/// The host may be an IP address or a host name; it is resolved by the
/// operating system when the connection is opened.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ServerConf {
    /// The host to connect to.
    pub host: String,

    /// The port to connect to.
    pub port: u16,
}

impl ServerConf {
    /// Returns a new server config for the given host and the DNS port.
    pub fn new<S: Into<String>>(host: S) -> Self {
        ServerConf {
            host: host.into(),
            port: 53,
        }
    }

    /// Returns a new server config for the given host and port.
    pub fn with_port<S: Into<String>>(host: S, port: u16) -> Self {
        ServerConf {
            host: host.into(),
            port,
        }
    }

    /// Parses a single `host` or `host:port` entry.
    ///
    /// Surrounding white space is trimmed. Returns `None` for an entry
    /// that is empty after trimming. Anything before a final colon
    /// followed by a valid port number is the host; without such a
    /// suffix the whole entry is the host and the port defaults to 53.
    pub fn from_entry(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        if let Some((host, port)) = entry.rsplit_once(':') {
            if let Ok(port) = port.parse::<u16>() {
                if !host.is_empty() {
                    return Some(ServerConf::with_port(host, port));
                }
            }
        }
        Some(ServerConf::new(entry))
    }

    /// Returns whether two configs name the same server.
    ///
    /// Servers are the same when their hosts match ASCII case
    /// insensitively. The port takes no part in the comparison: a host
    /// only ever appears once in the effective pool, whichever port its
    /// first occurrence carries.
    pub fn same_server(&self, other: &Self) -> bool {
        self.host.eq_ignore_ascii_case(&other.host)
    }
}

//--- Display

impl fmt::Display for ServerConf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.port == 53 {
            self.host.fmt(f)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

//------------ ResolvOptions -------------------------------------------------

/// Options for the resolver configuration.
#[derive(Clone, Debug)]
pub struct ResolvOptions {
    /// Merge the OS-discovered servers into the effective pool.
    pub use_os_servers: bool,

    /// Emit additional per-lookup diagnostics.
    pub debug: bool,

    /// Timeout for establishing a TCP connection.
    ///
    /// The default of 65535 seconds leaves connecting effectively
    /// unbounded and defers to the operating system's own limits.
    pub timeout_connect: Duration,

    /// Port used for servers learned from an NS referral.
    pub referral_port: u16,
}

impl Default for ResolvOptions {
    fn default() -> Self {
        ResolvOptions {
            use_os_servers: false,
            debug: false,
            timeout_connect: Duration::from_secs(u64::from(u16::MAX)),
            referral_port: 53,
        }
    }
}

//------------ ResolvConf ----------------------------------------------------

/// Resolver configuration.
///
/// A fresh configuration has no servers at all. A configuration whose
/// effective server list comes up empty falls back to `127.0.0.1:53`,
/// which is what glibc's resolver does in the same situation.
#[derive(Clone, Debug, Default)]
pub struct ResolvConf {
    /// Servers from the user's preference list, in priority order.
    user_servers: Vec<ServerConf>,

    /// Servers discovered from the operating system.
    os_servers: Vec<ServerConf>,

    /// Default options.
    pub options: ResolvOptions,
}

impl ResolvConf {
    /// Creates a new, empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the user server list from a `;`-delimited string.
    ///
    /// Each entry is a `host` or `host:port`; entries are trimmed and
    /// empty entries are ignored.
    pub fn set_nameservers(&mut self, servers: &str) {
        self.user_servers = servers
            .split(';')
            .filter_map(ServerConf::from_entry)
            .collect();
    }

    /// Replaces the OS-discovered server list.
    ///
    /// The list only takes part in server selection while
    /// [`use_os_servers`][ResolvOptions::use_os_servers] is set.
    pub fn set_os_servers(&mut self, servers: Vec<ServerConf>) {
        self.os_servers = servers;
    }

    /// Sets whether OS-discovered servers join the effective pool.
    pub fn set_use_os_servers(&mut self, use_os_servers: bool) {
        self.options.use_os_servers = use_os_servers;
    }

    /// Sets whether additional per-lookup diagnostics are emitted.
    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
    }

    /// Sets the TCP connect timeout in seconds.
    pub fn set_timeout_connect(&mut self, seconds: u32) {
        self.options.timeout_connect =
            Duration::from_secs(u64::from(seconds));
    }

    /// Returns the user server list.
    pub fn user_servers(&self) -> &[ServerConf] {
        &self.user_servers
    }

    /// Returns the OS-discovered server list.
    pub fn os_servers(&self) -> &[ServerConf] {
        &self.os_servers
    }

    /// Returns the effective server list for a lookup.
    ///
    /// User servers first, then, with
    /// [`use_os_servers`][ResolvOptions::use_os_servers] set, the
    /// OS-discovered ones; entries duplicating an earlier host are
    /// dropped. An otherwise empty list falls back to the local host.
    pub fn effective_servers(&self) -> Vec<ServerConf> {
        let mut servers: Vec<ServerConf> = Vec::new();
        let os_servers = if self.options.use_os_servers {
            self.os_servers.as_slice()
        } else {
            &[]
        };
        for server in self.user_servers.iter().chain(os_servers) {
            if !servers.iter().any(|s| s.same_server(server)) {
                servers.push(server.clone());
            }
        }
        if servers.is_empty() {
            servers.push(ServerConf::new("127.0.0.1"));
        }
        servers
    }
}

//--- Display

impl fmt::Display for ResolvConf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for server in self.effective_servers() {
            writeln!(f, "nameserver {}", server)?;
        }
        let mut options = Vec::new();
        if self.options.use_os_servers {
            options.push("use-os-servers".into());
        }
        if self.options.debug {
            options.push("debug".into());
        }
        if self.options.timeout_connect
            != ResolvOptions::default().timeout_connect
        {
            options.push(format!(
                "timeout-connect:{}",
                self.options.timeout_connect.as_secs()
            ));
        }
        if !options.is_empty() {
            write!(f, "options")?;
            for option in options {
                write!(f, " {}", option)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================
