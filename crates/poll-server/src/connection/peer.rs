//! Individual WebSocket peer
//!
//! A peer pairs its handshake metadata with the sending half of the
//! connection's outbound frame queue. The metadata is what lands in the
//! persisted side index; the sender never leaves this process.

use std::sync::Arc;

use poll_core::entities::PeerInfo;
use tokio::sync::mpsc;

/// One live WebSocket connection
pub struct Peer {
    /// Unique connection id
    id: String,
    /// Handshake request path
    path: String,
    /// Broadcast channel this peer subscribed to
    channel: String,
    /// Optional caller-supplied user id
    user_id: Option<String>,
    /// Outbound queue of pre-serialized text frames
    sender: mpsc::Sender<String>,
}

impl Peer {
    /// Create a new peer
    pub fn new(
        id: String,
        path: impl Into<String>,
        channel: impl Into<String>,
        user_id: Option<String>,
        sender: mpsc::Sender<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            path: path.into(),
            channel: channel.into(),
            user_id,
            sender,
        })
    }

    /// Generate a fresh connection id
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the connection id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the subscribed channel
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Descriptive metadata for the persisted side index
    pub fn info(&self) -> PeerInfo {
        PeerInfo::new(
            self.id.clone(),
            self.path.clone(),
            self.channel.clone(),
            self.user_id.clone(),
        )
    }

    /// Queue a text frame without blocking
    ///
    /// Fails when the peer's outbound queue is full or its pump task is
    /// gone; the caller decides what to do with that.
    pub fn try_send(&self, frame: String) -> Result<(), mpsc::error::TrySendError<String>> {
        self.sender.try_send(frame)
    }

    /// Check if the outbound queue is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_metadata() {
        let (tx, _rx) = mpsc::channel(4);
        let peer = Peer::new(
            "p1".to_string(),
            "/ws",
            "default",
            Some("u1".to_string()),
            tx,
        );

        let info = peer.info();
        assert_eq!(info.id, "p1");
        assert_eq!(info.path, "/ws");
        assert_eq!(info.channel, "default");
        assert_eq!(info.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_try_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let peer = Peer::new("p1".to_string(), "/ws", "default", None, tx);

        drop(rx);
        assert!(peer.is_closed());
        assert!(peer.try_send("frame".to_string()).is_err());
    }
}
