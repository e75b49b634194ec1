//! File-backed implementation of the `RecordStore` and `PeerIndex` ports

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use poll_core::entities::{AdminCredential, Answer, AnswerOption, PeerInfo, Question};
use poll_core::traits::{DomainResult, PeerIndex, RecordStore};
use poll_core::{aggregate, normalize_options, DomainError, VoteTally};

use crate::document::JsonDocument;
use crate::error::StoreError;
use crate::seed;

const QUESTIONS_FILE: &str = "questions.json";
const ANSWERS_FILE: &str = "answers.json";
const ADMIN_FILE: &str = "admin.json";
const PEERS_FILE: &str = "peers.json";

/// Generate a fresh opaque entity id
fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// File-backed record store
///
/// Owns the four backing documents and their locks. Every operation runs a
/// complete read-modify-write cycle under the relevant document lock;
/// `publish_question` is the only operation holding two locks and always
/// acquires questions before answers.
pub struct FileRecordStore {
    pub(crate) questions: JsonDocument<Vec<Question>>,
    pub(crate) answers: JsonDocument<Vec<Answer>>,
    admin: JsonDocument<AdminCredential>,
    peers: JsonDocument<Vec<PeerInfo>>,
    pub(crate) data_dir: PathBuf,
}

impl FileRecordStore {
    /// Open the store rooted at `data_dir`
    ///
    /// Creates the directory if needed, seeds the admin credential document
    /// on first run, truncates the peer side index (its contents never
    /// outlive a process), and ingests any pending predefined-question seed
    /// file. Seed ingestion failure is logged but never aborts startup.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        default_admin: AdminCredential,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| StoreError::io(&data_dir, e))?;

        let store = Self {
            questions: JsonDocument::new(data_dir.join(QUESTIONS_FILE)),
            answers: JsonDocument::new(data_dir.join(ANSWERS_FILE)),
            admin: JsonDocument::new(data_dir.join(ADMIN_FILE)),
            peers: JsonDocument::new(data_dir.join(PEERS_FILE)),
            data_dir,
        };

        {
            let guard = store.admin.lock().await;
            if guard.load().await?.is_none() {
                guard.store(&default_admin).await?;
                tracing::info!(username = %default_admin.username, "Seeded admin credential");
            }
        }

        // Peer metadata from a previous run is stale by definition.
        store.peers.lock().await.store(&Vec::new()).await?;

        match seed::ingest_predefined_questions(&store).await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "Ingested predefined questions"),
            Err(e) => {
                tracing::error!(error = %e, "Predefined question ingestion failed");
            }
        }

        Ok(store)
    }

    /// The directory holding the backing documents
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Look up one question under the questions lock
    async fn find_question(&self, id: &str) -> DomainResult<Question> {
        let questions = self.questions.read().await?.unwrap_or_default();
        questions
            .into_iter()
            .find(|q| q.id == id)
            .ok_or_else(|| DomainError::QuestionNotFound(id.to_string()))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create_question(
        &self,
        question_text: &str,
        answer_options: Vec<AnswerOption>,
        note: Option<String>,
    ) -> DomainResult<Question> {
        let text = question_text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("question text must not be empty"));
        }
        let options = normalize_options(answer_options)?;

        let question = Question::new(new_id(), text.to_string(), options, note);
        let created = question.clone();

        self.questions
            .update(|questions| questions.push(question))
            .await?;

        tracing::info!(question_id = %created.id, "Question created");
        Ok(created)
    }

    async fn publish_question(&self, id: &str) -> DomainResult<Question> {
        // One critical section over both documents: questions first,
        // answers second. No other operation takes both locks.
        let questions_guard = self.questions.lock().await;
        let mut questions = questions_guard.load_or_default().await?;

        let target = questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| DomainError::QuestionNotFound(id.to_string()))?;

        for question in &mut questions {
            question.is_active = false;
        }
        questions[target].is_active = true;
        questions[target].already_published = true;
        let published = questions[target].clone();

        let answers_guard = self.answers.lock().await;
        questions_guard.store(&questions).await?;
        answers_guard.store(&Vec::new()).await?;
        drop(answers_guard);
        drop(questions_guard);

        tracing::info!(question_id = %published.id, "Question published, answers cleared");
        Ok(published)
    }

    async fn toggle_question_lock(&self, id: &str) -> DomainResult<Question> {
        let guard = self.questions.lock().await;
        let mut questions = guard.load_or_default().await?;

        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| DomainError::QuestionNotFound(id.to_string()))?;

        question.is_locked = !question.is_locked;
        let toggled = question.clone();
        guard.store(&questions).await?;
        drop(guard);

        tracing::info!(
            question_id = %toggled.id,
            is_locked = toggled.is_locked,
            "Question lock toggled"
        );
        Ok(toggled)
    }

    async fn submit_answer(
        &self,
        question_id: &str,
        user_id: &str,
        user_nickname: &str,
        selected_answer: &str,
    ) -> DomainResult<Vec<Answer>> {
        let question = self.find_question(question_id).await?;
        if !question.has_option(selected_answer) {
            return Err(DomainError::InvalidAnswer {
                selected: selected_answer.to_string(),
            });
        }

        let updated = self
            .answers
            .update(|answers| {
                match answers
                    .iter_mut()
                    .find(|a| a.question_id == question_id && a.user_id == user_id)
                {
                    Some(existing) => existing.reselect(selected_answer.to_string()),
                    None => answers.push(Answer::new(
                        new_id(),
                        question_id.to_string(),
                        user_id.to_string(),
                        user_nickname.to_string(),
                        selected_answer.to_string(),
                    )),
                }
                answers.clone()
            })
            .await?;

        tracing::debug!(question_id, user_id, "Answer recorded");
        Ok(updated)
    }

    async fn retract_answer(&self, user_id: &str, question_id: &str) -> DomainResult<()> {
        let removed = self
            .answers
            .update(|answers| {
                let before = answers.len();
                answers.retain(|a| !(a.question_id == question_id && a.user_id == user_id));
                before != answers.len()
            })
            .await?;

        if removed {
            tracing::debug!(question_id, user_id, "Answer retracted");
        }
        Ok(())
    }

    async fn list_questions(&self) -> DomainResult<Vec<Question>> {
        Ok(self.questions.read().await?.unwrap_or_default())
    }

    async fn get_active_question(&self) -> DomainResult<Option<Question>> {
        let questions = self.questions.read().await?.unwrap_or_default();
        Ok(questions.into_iter().find(|q| q.is_active))
    }

    async fn answers_for_question(&self, question_id: &str) -> DomainResult<Vec<Answer>> {
        let answers = self.answers.read().await?.unwrap_or_default();
        Ok(answers
            .into_iter()
            .filter(|a| a.question_id == question_id)
            .collect())
    }

    async fn get_results_for_question(
        &self,
        question_id: &str,
    ) -> DomainResult<Option<VoteTally>> {
        let question = match self.find_question(question_id).await {
            Ok(question) => question,
            Err(DomainError::QuestionNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let answers = self.answers_for_question(question_id).await?;
        Ok(Some(aggregate(&question, &answers)))
    }

    async fn get_current_results(&self) -> DomainResult<Option<VoteTally>> {
        let Some(question) = self.get_active_question().await? else {
            return Ok(None);
        };
        let answers = self.answers_for_question(&question.id).await?;
        Ok(Some(aggregate(&question, &answers)))
    }

    async fn validate_admin(&self, username: &str, password: &str) -> DomainResult<bool> {
        let credential = self
            .admin
            .read()
            .await?
            .ok_or_else(|| DomainError::storage("admin credential document missing"))?;
        Ok(credential.matches(username, password))
    }
}

#[async_trait]
impl PeerIndex for FileRecordStore {
    async fn upsert(&self, peer: PeerInfo) -> DomainResult<()> {
        self.peers
            .update(|peers| {
                peers.retain(|p| p.id != peer.id);
                peers.push(peer);
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, peer_id: &str) -> DomainResult<()> {
        self.peers
            .update(|peers| peers.retain(|p| p.id != peer_id))
            .await?;
        Ok(())
    }

    async fn list(&self, channel: Option<&str>) -> DomainResult<Vec<PeerInfo>> {
        let peers = self.peers.read().await?.unwrap_or_default();
        Ok(match channel {
            Some(channel) => peers.into_iter().filter(|p| p.channel == channel).collect(),
            None => peers,
        })
    }

    async fn clear(&self) -> DomainResult<()> {
        self.peers.update(|peers| peers.clear()).await?;
        Ok(())
    }
}
