//! Connection registry
//!
//! Tracks live WebSocket peers per channel and mirrors their metadata into
//! the persisted side index. The registry is the only mutation surface for
//! connection state: register on open, deregister on close, broadcast. It is
//! constructed in the server bootstrap and injected; no ambient globals.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};

use poll_core::entities::PeerInfo;
use poll_core::traits::{DomainResult, PeerIndex};

use super::Peer;
use crate::events::{Envelope, PollEvent};

/// Registry of all live WebSocket connections
pub struct ConnectionRegistry {
    /// Live peers by connection id
    peers: DashMap<String, Arc<Peer>>,

    /// Channel name to connection ids
    channels: DashMap<String, HashSet<String>>,

    /// Persisted metadata side index
    index: Arc<dyn PeerIndex>,
}

impl ConnectionRegistry {
    /// Create a new registry over a peer metadata index
    #[must_use]
    pub fn new(index: Arc<dyn PeerIndex>) -> Self {
        Self {
            peers: DashMap::new(),
            channels: DashMap::new(),
            index,
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared(index: Arc<dyn PeerIndex>) -> Arc<Self> {
        Arc::new(Self::new(index))
    }

    /// Register a newly opened connection
    ///
    /// Adds the peer to its channel, upserts its metadata into the side
    /// index, and broadcasts the updated connection count. An index write
    /// failure is logged but does not reject the connection.
    pub async fn open(&self, peer: Arc<Peer>) {
        let id = peer.id().to_string();
        let channel = peer.channel().to_string();
        let info = peer.info();

        self.peers.insert(id.clone(), peer);
        self.channels.entry(channel).or_default().insert(id.clone());

        if let Err(e) = self.index.upsert(info).await {
            tracing::error!(peer_id = %id, error = %e, "Peer index upsert failed");
        }

        tracing::info!(peer_id = %id, "Connection opened");
        self.broadcast_connection_count();
    }

    /// Deregister a closed connection
    ///
    /// Removal happens only here; a failed send never evicts a peer.
    pub async fn close(&self, peer_id: &str) {
        if self.peers.remove(peer_id).is_none() {
            return;
        }

        self.channels.alter_all(|_, mut ids| {
            ids.remove(peer_id);
            ids
        });
        self.channels.retain(|_, ids| !ids.is_empty());

        if let Err(e) = self.index.remove(peer_id).await {
            tracing::error!(peer_id = %peer_id, error = %e, "Peer index removal failed");
        }

        tracing::info!(peer_id = %peer_id, "Connection closed");
        self.broadcast_connection_count();
    }

    /// List persisted peer metadata, optionally filtered by channel
    pub async fn list_peers(&self, channel: Option<&str>) -> DomainResult<Vec<PeerInfo>> {
        self.index.list(channel).await
    }

    /// Broadcast an event to every live connection in `channel`, or to all
    /// channels when omitted
    ///
    /// The envelope is serialized once. A failure to queue a frame on one
    /// connection is logged and skipped; it never propagates, never blocks
    /// the other deliveries, and never removes the peer.
    pub fn send(&self, event: PollEvent, data: Value, channel: Option<&str>) -> usize {
        let frame = match Envelope::new(event, data).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event = %event, error = %e, "Envelope serialization failed");
                return 0;
            }
        };

        // Snapshot the targets before sending so no map shard stays held.
        let targets: Vec<Arc<Peer>> = match channel {
            Some(channel) => self
                .channels
                .get(channel)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| self.peers.get(id).map(|p| p.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            None => self.peers.iter().map(|p| p.clone()).collect(),
        };

        let mut sent = 0;
        for peer in targets {
            match peer.try_send(frame.clone()) {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(
                        peer_id = %peer.id(),
                        event = %event,
                        error = %e,
                        "Delivery to peer failed"
                    );
                }
            }
        }

        tracing::trace!(event = %event, channel = ?channel, sent, "Event dispatched");
        sent
    }

    /// Number of live connections across all channels
    pub fn connection_count(&self) -> usize {
        self.peers.len()
    }

    /// Push the current connection count to everyone
    fn broadcast_connection_count(&self) {
        let count = self.connection_count();
        self.send(PollEvent::ConnectionsUpdate, json!({ "count": count }), None);
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("peers", &self.peers.len())
            .field("channels", &self.channels.len())
            .finish_non_exhaustive()
    }
}
