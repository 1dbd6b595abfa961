//! Looking up host addresses.

use std::net::Ipv4Addr;

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::rdata::RecordData;
use crate::stub::{QueryError, StubResolver};

//------------ lookup_host ---------------------------------------------------

/// Looks up the IPv4 addresses of a host name.
///
/// A lookup that ends without data yields an empty address list rather
/// than an error.
pub async fn lookup_host(
    resolver: &StubResolver,
    qname: &Name,
) -> Result<FoundHosts, QueryError> {
    let records = resolver.resolve(qname, Rtype::A).await?;
    let addrs = records
        .unwrap_or_default()
        .into_iter()
        .filter_map(|data| match data {
            RecordData::A(addr) => Some(addr),
            _ => None,
        })
        .collect();
    Ok(FoundHosts {
        qname: qname.clone(),
        addrs,
    })
}

//------------ FoundHosts ----------------------------------------------------

/// The success type of the [`lookup_host`] function.
#[derive(Clone, Debug)]
pub struct FoundHosts {
    /// The name the addresses were looked up for.
    qname: Name,

    /// The addresses found.
    addrs: Vec<Ipv4Addr>,
}

impl FoundHosts {
    /// Returns the name the addresses were looked up for.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns an iterator over the found addresses.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.addrs.iter().copied()
    }

    /// Returns whether the given address is among the found ones.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.addrs.contains(&addr)
    }

    /// Returns whether no addresses were found.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
