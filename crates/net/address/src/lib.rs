//! Peer address handling: parsing `/p2p/`-terminated multiaddrs, resolving
//! address strings through an external name resolution backend, and grouping
//! the results into dialable per-peer records.

pub mod error;
pub mod peer;
pub mod resolver;

pub use error::{AddressError, NameResolverError};
pub use peer::{PeerAddr, PeerRecord, aggregate_peers, ends_with_peer_id};
pub use resolver::{AddressResolver, NameResolver, RESOLVE_TIMEOUT};
