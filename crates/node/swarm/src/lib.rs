//! Swarm control surface: connect/disconnect orchestration over an abstract
//! dialer, connection and address listing for display, and pre-shared swarm
//! key generation.

pub mod dial;
pub mod peers;
pub mod psk;

pub use dial::{DialError, Dialer, SwarmError, connect_peers, disconnect_peers};
pub use peers::{
    ConnInfo, Direction, PeerListOpts, format_known_addrs, format_local_addrs, format_peers,
};
pub use psk::generate_swarm_key;
