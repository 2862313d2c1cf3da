//! Connect/disconnect orchestration over an abstract dialer.

use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId};
use thiserror::Error;
use tracing::debug;

use harbor_net_address::{AddressError, AddressResolver, NameResolver, PeerAddr, PeerRecord};

/// Error reported by the transport layer for one dial or hangup.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DialError(pub String);

impl From<&str> for DialError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

/// Transport boundary: opens and closes connections for resolved peers.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn connect(&self, peer: &PeerRecord) -> Result<(), DialError>;
    async fn disconnect(&self, addr: &Multiaddr) -> Result<(), DialError>;
}

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("connect {peer} failure: {source}")]
    Connect { peer: PeerId, source: DialError },
}

/// Resolve the given address strings and open one connection per peer.
///
/// Fail-fast: the first dial failure aborts the batch with an error naming
/// the peer. Successful dials are reported as `connect <peer> success`
/// lines.
pub async fn connect_peers<R, D>(
    resolver: &AddressResolver<R>,
    dialer: &D,
    addrs: &[impl AsRef<str>],
) -> Result<Vec<String>, SwarmError>
where
    R: NameResolver + 'static,
    D: Dialer + ?Sized,
{
    let peers = resolver.resolve_peers(addrs).await?;

    let mut output = Vec::with_capacity(peers.len());
    for peer in &peers {
        dialer
            .connect(peer)
            .await
            .map_err(|source| SwarmError::Connect {
                peer: peer.peer_id,
                source,
            })?;
        debug!(peer_id = %peer.peer_id, "connected");
        output.push(format!("connect {} success", peer.peer_id));
    }
    Ok(output)
}

/// Close connections to the given peer addresses.
///
/// No name resolution happens here; every address must already carry its
/// peer id. Per-address failures end up in the output lines rather than
/// aborting the batch.
pub async fn disconnect_peers<D>(
    dialer: &D,
    addrs: &[impl AsRef<str>],
) -> Result<Vec<String>, SwarmError>
where
    D: Dialer + ?Sized,
{
    let mut parsed = Vec::with_capacity(addrs.len());
    for raw in addrs {
        parsed.push(raw.as_ref().parse::<PeerAddr>()?);
    }

    let mut output = Vec::with_capacity(parsed.len());
    for addr in &parsed {
        let line = match dialer.disconnect(&addr.multiaddr()).await {
            Ok(()) => {
                debug!(peer_id = %addr.peer_id(), "disconnected");
                format!("disconnect {} success", addr.peer_id())
            }
            Err(err) => format!("disconnect {} failure: {err}", addr.peer_id()),
        };
        output.push(line);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use harbor_net_address::NameResolverError;
    use parking_lot::Mutex;

    use super::*;

    /// Backend for tests that only use pre-resolved addresses.
    struct NoResolver;

    #[async_trait]
    impl NameResolver for NoResolver {
        async fn resolve_name(
            &self,
            _addr: &Multiaddr,
        ) -> Result<Vec<Multiaddr>, NameResolverError> {
            Err(NameResolverError::from("resolution disabled"))
        }
    }

    /// Dialer recording calls, failing for a configured peer.
    #[derive(Default)]
    struct RecordingDialer {
        connected: Mutex<Vec<PeerId>>,
        disconnected: Mutex<Vec<Multiaddr>>,
        fail_peer: Option<PeerId>,
    }

    #[async_trait]
    impl Dialer for RecordingDialer {
        async fn connect(&self, peer: &PeerRecord) -> Result<(), DialError> {
            if self.fail_peer == Some(peer.peer_id) {
                return Err(DialError::from("connection refused"));
            }
            self.connected.lock().push(peer.peer_id);
            Ok(())
        }

        async fn disconnect(&self, addr: &Multiaddr) -> Result<(), DialError> {
            self.disconnected.lock().push(addr.clone());
            Ok(())
        }
    }

    /// Well-known peer ids so tests need no key generation.
    fn peer_id(i: usize) -> PeerId {
        const IDS: &[&str] = &[
            "QmaCpDMGvV2BGHeYERUEnRQAwe3N8SzbUtfsmvsqQLuvuJ",
            "QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN",
            "QmQCU2EcMqAqQPR2i9bChDtGNJchTbq5TbXJJ16u19uLTa",
            "QmbLHAnMoJPWSCR5Zhtx6BHJX9KiKNN6tpvbUcqanj75Nb",
        ];
        IDS.get(i).unwrap().parse().unwrap()
    }

    fn addr_for(peer_id: PeerId, ip: &str) -> String {
        format!("/ip4/{ip}/tcp/4001/p2p/{peer_id}")
    }

    #[tokio::test]
    async fn test_connect_dials_once_per_peer() {
        let peer_id = peer_id(0);
        let resolver = AddressResolver::new(Arc::new(NoResolver));
        let dialer = RecordingDialer::default();

        let output = connect_peers(
            &resolver,
            &dialer,
            &[addr_for(peer_id, "1.1.1.1"), addr_for(peer_id, "2.2.2.2")],
        )
        .await
        .unwrap();

        assert_eq!(output, vec![format!("connect {peer_id} success")]);
        assert_eq!(dialer.connected.lock().as_slice(), &[peer_id]);
    }

    #[tokio::test]
    async fn test_connect_aborts_on_first_failure() {
        let peer_id = peer_id(0);
        let resolver = AddressResolver::new(Arc::new(NoResolver));
        let dialer = RecordingDialer {
            fail_peer: Some(peer_id),
            ..Default::default()
        };

        let err = connect_peers(&resolver, &dialer, &[addr_for(peer_id, "1.1.1.1")])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("connect {peer_id} failure: connection refused")
        );
    }

    #[tokio::test]
    async fn test_disconnect_reports_per_address() {
        let peer_id = peer_id(0);
        let dialer = RecordingDialer::default();

        let output = disconnect_peers(&dialer, &[addr_for(peer_id, "1.1.1.1")])
            .await
            .unwrap();

        assert_eq!(output, vec![format!("disconnect {peer_id} success")]);
        assert_eq!(dialer.disconnected.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_rejects_address_without_peer_id() {
        let dialer = RecordingDialer::default();

        let err = disconnect_peers(&dialer, &["/ip4/1.1.1.1/tcp/4001"])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SwarmError::Address(AddressError::MissingPeerId(_))
        ));
    }
}
