//! Storage port traits

mod record_store;

pub use record_store::{DomainResult, PeerIndex, RecordStore};
