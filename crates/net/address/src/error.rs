//! Error types for peer address parsing and resolution.

use std::time::Duration;

use libp2p::Multiaddr;
use thiserror::Error;

/// Error reported by an external name resolution backend.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct NameResolverError(pub String);

impl From<&str> for NameResolverError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AddressError {
    /// The input is not a syntactically valid multiaddr.
    #[error("invalid peer address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: libp2p::multiaddr::Error,
    },

    /// The address does not end in a `/p2p/<id>` segment.
    #[error("address does not end in a peer id: {0}")]
    MissingPeerId(Multiaddr),

    /// Resolution produced no candidates carrying a peer id.
    #[error("found no peers at {0}")]
    NoPeers(Multiaddr),

    /// The resolution backend failed for one address.
    #[error("resolving {addr} failed: {source}")]
    Resolution {
        addr: Multiaddr,
        source: NameResolverError,
    },

    /// The shared batch deadline elapsed before every address resolved.
    #[error("resolution deadline of {0:?} exceeded")]
    Timeout(Duration),
}
