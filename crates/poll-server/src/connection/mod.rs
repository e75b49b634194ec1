//! Live connection tracking

mod peer;
mod registry;

pub use peer::Peer;
pub use registry::ConnectionRegistry;

#[cfg(test)]
pub(crate) use registry::tests as registry_tests;

/// Channel assigned to peers that do not ask for one
pub const DEFAULT_CHANNEL: &str = "default";

/// Auxiliary channel carrying audience emoji reactions
pub const EMOJI_CHANNEL: &str = "emojis";
