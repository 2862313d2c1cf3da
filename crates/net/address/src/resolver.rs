//! Concurrent resolution of peer address strings.
//!
//! Addresses already ending in `/p2p/<id>` pass through without touching the
//! resolution backend; the rest fan out to it, one task per address, all
//! bound to a single batch deadline. A single unresolvable address fails the
//! whole batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use libp2p::Multiaddr;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::{AddressError, NameResolverError};
use crate::peer::{PeerAddr, PeerRecord, aggregate_peers, ends_with_peer_id};

/// Default deadline for one resolution batch.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// External name resolution backend (e.g. `/dnsaddr/` TXT record lookup).
///
/// Implementations must tolerate concurrent calls for distinct inputs.
/// Cancellation is signalled by dropping the future once the batch deadline
/// passes; there is no per-address cancellation.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_name(&self, addr: &Multiaddr) -> Result<Vec<Multiaddr>, NameResolverError>;
}

/// Resolves batches of raw peer address strings against a [`NameResolver`].
pub struct AddressResolver<R> {
    resolver: Arc<R>,
    timeout: Duration,
}

impl<R> AddressResolver<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            timeout: RESOLVE_TIMEOUT,
        }
    }

    /// Set the deadline applied to each resolution batch as a whole.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<R: NameResolver + 'static> AddressResolver<R> {
    /// Resolve raw address strings to `/p2p/`-terminated multiaddrs.
    ///
    /// Fail-fast: a syntactically invalid address, an address the backend
    /// cannot produce any peer-carrying candidate for, or an elapsed batch
    /// deadline fails the whole call with no partial result. Output order is
    /// not deterministic; callers needing stable output must sort.
    pub async fn resolve(
        &self,
        addrs: &[impl AsRef<str>],
    ) -> Result<Vec<Multiaddr>, AddressError> {
        let deadline = Instant::now() + self.timeout;

        let mut resolved = Vec::with_capacity(addrs.len());
        let mut pending = Vec::new();
        for raw in addrs {
            let raw = raw.as_ref();
            let addr: Multiaddr = raw.parse().map_err(|source| AddressError::InvalidAddress {
                addr: raw.to_string(),
                source,
            })?;
            if ends_with_peer_id(&addr) {
                resolved.push(addr);
            } else {
                pending.push(addr);
            }
        }

        if pending.is_empty() {
            return Ok(resolved);
        }

        // One task per pending address, feeding two channels: candidates on
        // one, per-address failures on the other. The error channel holds at
        // most one entry per task, so sends never block.
        let (addr_tx, mut addr_rx) = mpsc::channel(pending.len());
        let (err_tx, mut err_rx) = mpsc::channel::<AddressError>(pending.len());

        let timeout = self.timeout;
        for addr in pending {
            let resolver = Arc::clone(&self.resolver);
            let addr_tx = addr_tx.clone();
            let err_tx = err_tx.clone();
            tokio::spawn(async move {
                let candidates = match time::timeout_at(deadline, resolver.resolve_name(&addr)).await
                {
                    Ok(Ok(candidates)) => candidates,
                    Ok(Err(source)) => {
                        let _ = err_tx.send(AddressError::Resolution { addr, source }).await;
                        return;
                    }
                    Err(_) => {
                        let _ = err_tx.send(AddressError::Timeout(timeout)).await;
                        return;
                    }
                };

                let mut found = 0usize;
                for candidate in candidates {
                    if ends_with_peer_id(&candidate) {
                        if addr_tx.send(candidate).await.is_err() {
                            return;
                        }
                        found += 1;
                    } else {
                        trace!(%candidate, "dropping resolved candidate without peer id");
                    }
                }
                if found == 0 {
                    let _ = err_tx.send(AddressError::NoPeers(addr)).await;
                }
            });
        }
        drop(addr_tx);
        drop(err_tx);

        // Drain candidates until every task has hung up, bounded by the
        // shared deadline. Stragglers past the deadline are not waited for.
        let drain = async {
            while let Some(addr) = addr_rx.recv().await {
                resolved.push(addr);
            }
        };
        if time::timeout_at(deadline, drain).await.is_err() {
            return Err(AddressError::Timeout(self.timeout));
        }

        // Non-blocking check: any queued failure fails the batch. Which one
        // gets reported is not chronologically significant.
        if let Ok(err) = err_rx.try_recv() {
            return Err(err);
        }

        debug!(count = resolved.len(), "resolved address batch");
        Ok(resolved)
    }

    /// Resolve raw address strings and group them into dialable records.
    pub async fn resolve_peers(
        &self,
        addrs: &[impl AsRef<str>],
    ) -> Result<Vec<PeerRecord>, AddressError> {
        let resolved = self.resolve(addrs).await?;
        let mut peer_addrs = Vec::with_capacity(resolved.len());
        for addr in resolved {
            peer_addrs.push(PeerAddr::from_multiaddr(addr)?);
        }
        Ok(aggregate_peers(peer_addrs))
    }
}
