//! # poll-store
//!
//! File-backed implementation of the storage ports defined in `poll-core`.
//!
//! ## Overview
//!
//! Poll state lives in independent JSON documents under one data directory:
//!
//! - `questions.json` - array of questions
//! - `answers.json` - array of answers
//! - `admin.json` - the single admin credential
//! - `peers.json` - connected-peer metadata side index
//!
//! Each document is read and mutated under its own exclusive, FIFO-queued
//! async lock held for the whole read-modify-write cycle; writes go to a
//! temp file and are renamed into place, so a crash mid-write never leaves a
//! torn document. The publish operation is the only one holding two locks,
//! and always acquires questions before answers.
//!
//! Initialization also ingests `predefined-questions.json` through a
//! rename-staged, all-or-nothing seed loader.

mod document;
mod error;
mod seed;
mod store;

pub use error::StoreError;
pub use store::FileRecordStore;
