//! Looking up host names for addresses.

use std::net::Ipv4Addr;
use std::str::FromStr;

use futures_util::future::join_all;
use tracing::debug;

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::rdata::RecordData;
use crate::stub::{QueryError, StubResolver};

use super::host::lookup_host;

//------------ lookup_addr ---------------------------------------------------

/// Looks up the host names of an IPv4 address.
///
/// Queries the PTR record of the address's `in-addr.arpa` name and then
/// confirms every candidate with a forward lookup: only names whose
/// addresses include the queried address make it into the result. The
/// forward lookups run concurrently; one of them failing merely drops its
/// candidate.
///
/// Returns `None` if the PTR lookup yields no names or no candidate
/// survives confirmation.
pub async fn lookup_addr(
    resolver: &StubResolver,
    addr: Ipv4Addr,
) -> Result<Option<FoundAddrs>, QueryError> {
    let qname = name_from_addr(addr);
    let records = match resolver.resolve(&qname, Rtype::Ptr).await? {
        Some(records) => records,
        None => return Ok(None),
    };
    let targets: Vec<Name> = records
        .into_iter()
        .filter_map(|data| match data {
            RecordData::Ptr(name) => Some(name),
            _ => None,
        })
        .collect();

    let confirmations =
        join_all(targets.into_iter().map(|target| async move {
            let confirmed = match lookup_host(resolver, &target).await {
                Ok(hosts) => hosts.contains(addr),
                Err(err) => {
                    debug!(
                        "forward lookup for {} failed: {}",
                        target, err
                    );
                    false
                }
            };
            (target, confirmed)
        }))
        .await;

    let names: Vec<Name> = confirmations
        .into_iter()
        .filter_map(|(target, confirmed)| confirmed.then_some(target))
        .collect();
    if names.is_empty() {
        Ok(None)
    } else {
        Ok(Some(FoundAddrs { names }))
    }
}

//------------ FoundAddrs ----------------------------------------------------

/// The success type of the [`lookup_addr`] function.
///
/// Holds the confirmed host names of the queried address.
#[derive(Clone, Debug)]
pub struct FoundAddrs {
    /// The confirmed names.
    names: Vec<Name>,
}

impl FoundAddrs {
    /// Returns an iterator over the confirmed host names.
    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.names.iter()
    }

    /// Returns the number of confirmed host names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether there are no confirmed host names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IntoIterator for FoundAddrs {
    type Item = Name;
    type IntoIter = std::vec::IntoIter<Name>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

//------------ Helper Functions ----------------------------------------------

/// Translates an IPv4 address into its reverse lookup name.
fn name_from_addr(addr: Ipv4Addr) -> Name {
    let octets = addr.octets();
    // The formatted name always holds valid labels well below the length
    // limits, so the conversion cannot fail.
    Name::from_str(&format!(
        "{}.{}.{}.{}.in-addr.arpa",
        octets[3], octets[2], octets[1], octets[0]
    ))
    .unwrap_or_else(|_| Name::root())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reverse_name() {
        assert_eq!(
            name_from_addr(Ipv4Addr::new(1, 2, 3, 4)).to_string(),
            "4.3.2.1.in-addr.arpa"
        );
        assert_eq!(
            name_from_addr(Ipv4Addr::new(192, 0, 2, 255)).to_string(),
            "255.2.0.192.in-addr.arpa"
        );
    }
}
