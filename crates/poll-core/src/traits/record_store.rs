//! Storage ports - define the interface for durable poll state
//!
//! The domain layer defines what it needs, and the storage layer provides
//! the implementation. The lock discipline is part of the contract: each
//! backing document is read and mutated under an exclusive, queued lock held
//! for the whole read-modify-write cycle, and operations spanning documents
//! acquire them in a fixed global order (questions before answers).

use async_trait::async_trait;

use crate::entities::{Answer, AnswerOption, PeerInfo, Question};
use crate::error::DomainError;
use crate::results::VoteTally;

/// Result type for storage operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Durable, lock-serialized storage for questions, answers, and the admin
/// credential
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new question
    ///
    /// Validates the text (non-empty after trim) and options (≥2 distinct
    /// non-empty after trim). The new question starts unlocked, inactive,
    /// and unpublished.
    async fn create_question(
        &self,
        question_text: &str,
        answer_options: Vec<AnswerOption>,
        note: Option<String>,
    ) -> DomainResult<Question>;

    /// Activate a question for voting
    ///
    /// Deactivates every other question, marks the target active and
    /// published, and truncates the answers document, all in one critical
    /// section over both documents.
    async fn publish_question(&self, id: &str) -> DomainResult<Question>;

    /// Flip a question's lock flag
    ///
    /// Locking blocks future submissions but never affects existing answers.
    async fn toggle_question_lock(&self, id: &str) -> DomainResult<Question>;

    /// Record a participant's vote
    ///
    /// `selected_answer` must exactly match a declared option text; case
    /// normalization happens at the HTTP boundary, not here. Upserts on
    /// `(question_id, user_id)` and returns the full updated answer set.
    async fn submit_answer(
        &self,
        question_id: &str,
        user_id: &str,
        user_nickname: &str,
        selected_answer: &str,
    ) -> DomainResult<Vec<Answer>>;

    /// Remove a participant's vote; idempotent no-op when absent
    async fn retract_answer(&self, user_id: &str, question_id: &str) -> DomainResult<()>;

    /// All questions, in creation order
    async fn list_questions(&self) -> DomainResult<Vec<Question>>;

    /// The question currently open for voting, if any
    async fn get_active_question(&self) -> DomainResult<Option<Question>>;

    /// All answers recorded for one question
    async fn answers_for_question(&self, question_id: &str) -> DomainResult<Vec<Answer>>;

    /// Tally for one question; `None` when the id is unresolved
    async fn get_results_for_question(&self, question_id: &str)
        -> DomainResult<Option<VoteTally>>;

    /// Tally for the active question; `None` when nothing is active
    async fn get_current_results(&self) -> DomainResult<Option<VoteTally>>;

    /// Compare a login against the single stored admin credential
    async fn validate_admin(&self, username: &str, password: &str) -> DomainResult<bool>;
}

/// Persisted side index of connected-peer metadata
///
/// Holds descriptive metadata only, never live handles. Contents need not
/// survive a process restart; the index is cleared at startup.
#[async_trait]
pub trait PeerIndex: Send + Sync {
    /// Insert or replace a peer's metadata (dedup by id, last write wins)
    async fn upsert(&self, peer: PeerInfo) -> DomainResult<()>;

    /// Remove a peer's metadata; no-op when absent
    async fn remove(&self, peer_id: &str) -> DomainResult<()>;

    /// List peer metadata, optionally filtered by channel
    async fn list(&self, channel: Option<&str>) -> DomainResult<Vec<PeerInfo>>;

    /// Drop all entries
    async fn clear(&self) -> DomainResult<()>;
}
