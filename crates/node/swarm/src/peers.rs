//! Connection and address listing for display.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use libp2p::{Multiaddr, PeerId};

/// Direction of an established connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Unknown,
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => Ok(()),
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// One established connection, as reported by the connection layer.
#[derive(Debug, Clone)]
pub struct ConnInfo {
    pub peer: PeerId,
    pub addr: Multiaddr,
    pub latency: Option<Duration>,
    pub direction: Direction,
    pub streams: Vec<String>,
}

/// Which extra columns to render in the peer list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerListOpts {
    pub latency: bool,
    pub direction: bool,
    pub streams: bool,
}

impl PeerListOpts {
    pub fn verbose() -> Self {
        Self {
            latency: true,
            direction: true,
            streams: true,
        }
    }
}

/// Render connections as `<addr>/p2p/<peer>` lines, sorted by address, with
/// optional latency, direction, and per-stream protocol lines.
pub fn format_peers(mut conns: Vec<ConnInfo>, opts: PeerListOpts) -> Vec<String> {
    conns.sort_by(|a, b| a.addr.to_string().cmp(&b.addr.to_string()));

    let mut out = Vec::with_capacity(conns.len());
    for conn in conns {
        let mut line = format!("{}/p2p/{}", conn.addr, conn.peer);
        if opts.latency {
            match conn.latency {
                Some(latency) => line.push_str(&format!(" {latency:?}")),
                None => line.push_str(" n/a"),
            }
        }
        if opts.direction && conn.direction != Direction::Unknown {
            line.push_str(&format!(" {}", conn.direction));
        }
        out.push(line);

        if opts.streams {
            let mut protocols = conn.streams;
            protocols.sort();
            for protocol in protocols {
                if protocol.is_empty() {
                    out.push("  <no protocol name>".to_string());
                } else {
                    out.push(format!("  {protocol}"));
                }
            }
        }
    }
    out
}

/// Render the known-address map: peers sorted by id, one header line with
/// the address count, then one indented line per address.
pub fn format_known_addrs(addrs: &HashMap<PeerId, Vec<Multiaddr>>) -> Vec<String> {
    let mut ids: Vec<&PeerId> = addrs.keys().collect();
    ids.sort_by_key(|id| id.to_string());

    let mut out = Vec::with_capacity(addrs.len());
    for id in ids {
        if let Some(peer_addrs) = addrs.get(id) {
            out.push(format!("{} ({})", id, peer_addrs.len()));
            for addr in peer_addrs {
                out.push(format!("\t{addr}"));
            }
        }
    }
    out
}

/// Local listen addresses, sorted, optionally suffixed with the node's own
/// peer id.
pub fn format_local_addrs(addrs: &[Multiaddr], self_id: Option<PeerId>) -> Vec<String> {
    let mut out: Vec<String> = addrs
        .iter()
        .map(|addr| match self_id {
            Some(id) => format!("{addr}/p2p/{id}"),
            None => addr.to_string(),
        })
        .collect();
    out.sort();
    out
}
