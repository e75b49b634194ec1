//! Peer metadata - descriptive record of one live duplex connection
//!
//! The live connection handle itself is owned by the connection registry and
//! is never persisted; only this metadata goes into the side index.

use serde::{Deserialize, Serialize};

/// Descriptive metadata for one connected peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Unique connection id
    pub id: String,
    /// Handshake request path
    pub path: String,
    /// Broadcast channel the peer subscribed to
    pub channel: String,
    /// Optional caller-supplied user id from the handshake query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PeerInfo {
    /// Create peer metadata for a new connection
    pub fn new(
        id: String,
        path: impl Into<String>,
        channel: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            channel: channel.into(),
            user_id,
        }
    }
}
