//! Structured peer addresses and per-peer aggregation.
//!
//! A [`PeerAddr`] is a multiaddr that ends in a `/p2p/<id>` segment, split
//! into its transport locator and the peer id. A [`PeerRecord`] collects
//! every transport locator supplied for one peer.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

use crate::error::AddressError;

/// A multiaddr split into transport locator and trailing peer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr {
    peer_id: PeerId,
    transport: Option<Multiaddr>,
}

impl PeerAddr {
    /// Split a multiaddr into its transport part and trailing peer id.
    ///
    /// Fails with [`AddressError::MissingPeerId`] when the final segment is
    /// not `/p2p/<id>`. An address consisting only of the peer id segment
    /// has no transport locator.
    pub fn from_multiaddr(addr: Multiaddr) -> Result<Self, AddressError> {
        let mut transport = addr.clone();
        match transport.pop() {
            Some(Protocol::P2p(peer_id)) => Ok(Self {
                peer_id,
                transport: (!transport.is_empty()).then_some(transport),
            }),
            _ => Err(AddressError::MissingPeerId(addr)),
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Transport locator, if the address carried one.
    pub fn transport(&self) -> Option<&Multiaddr> {
        self.transport.as_ref()
    }

    /// Reassemble the full multiaddr including the `/p2p/` segment.
    pub fn multiaddr(&self) -> Multiaddr {
        self.transport
            .clone()
            .unwrap_or_else(Multiaddr::empty)
            .with(Protocol::P2p(self.peer_id))
    }
}

impl FromStr for PeerAddr {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr: Multiaddr = s.parse().map_err(|source| AddressError::InvalidAddress {
            addr: s.to_string(),
            source,
        })?;
        Self::from_multiaddr(addr)
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.multiaddr().fmt(f)
    }
}

/// Whether a multiaddr ends in a `/p2p/<id>` segment.
pub fn ends_with_peer_id(addr: &Multiaddr) -> bool {
    matches!(addr.iter().last(), Some(Protocol::P2p(_)))
}

/// A dialable peer: identity plus every transport locator supplied for it.
///
/// An empty address list means the identity was supplied without transport
/// info and lower-level discovery has to find a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub peer_id: PeerId,
    pub addrs: Vec<Multiaddr>,
}

/// Group structured addresses by peer identity.
///
/// Identities keep their first-seen order; transport locators are
/// deduplicated within each record. Addresses without transport info
/// contribute only the identity.
pub fn aggregate_peers(addrs: impl IntoIterator<Item = PeerAddr>) -> Vec<PeerRecord> {
    let mut records: Vec<PeerRecord> = Vec::new();
    let mut slots: HashMap<PeerId, usize> = HashMap::new();

    for addr in addrs {
        let slot = *slots.entry(addr.peer_id()).or_insert_with(|| {
            records.push(PeerRecord {
                peer_id: addr.peer_id(),
                addrs: Vec::new(),
            });
            records.len() - 1
        });
        if let (Some(transport), Some(record)) = (addr.transport(), records.get_mut(slot)) {
            if !record.addrs.contains(transport) {
                record.addrs.push(transport.clone());
            }
        }
    }

    records
}
