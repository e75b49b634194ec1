//! Predefined-question seed loader
//!
//! One-shot ingestion that runs at store initialization. The seed file is
//! first renamed to a processing name; that rename is the crash-safety
//! boundary: a crash before it consumes nothing, a crash after it leaves
//! the processing file behind for manual recovery. The whole batch is
//! validated before anything is applied; a single invalid entry aborts
//! ingestion and keeps the staged file.

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

use poll_core::entities::{AnswerOption, Question};
use poll_core::{normalize_options, DomainError};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::FileRecordStore;

const SEED_FILE: &str = "predefined-questions.json";
const PROCESSING_FILE: &str = "predefined-questions.processing";

/// One entry in the seed file
#[derive(Debug, Deserialize)]
struct SeedEntry {
    question_text: String,
    answer_options: Vec<AnswerOption>,
    #[serde(default)]
    note: Option<String>,
}

/// Seed ingestion errors
#[derive(Debug, Error)]
pub(crate) enum SeedError {
    #[error("Stale processing file present, skipping ingestion (recover or delete it first)")]
    StaleProcessingFile,

    #[error("Failed to stage seed file: {0}")]
    Stage(std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(serde_json::Error),

    #[error("Invalid seed entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ingest `predefined-questions.json` from the store's data directory
///
/// Returns the number of questions appended. A missing seed file is not an
/// error. Entries whose `question_text` exactly duplicates an existing or
/// already-batched question are skipped.
pub(crate) async fn ingest_predefined_questions(
    store: &FileRecordStore,
) -> Result<usize, SeedError> {
    let seed_path = store.data_dir.join(SEED_FILE);
    let processing_path = store.data_dir.join(PROCESSING_FILE);

    // A leftover processing file means a previous run crashed mid-ingestion;
    // renaming over it would destroy the data awaiting manual recovery.
    if fs::try_exists(&processing_path).await.unwrap_or(false) {
        return Err(SeedError::StaleProcessingFile);
    }

    // Step 1: stage. The rename is the crash-safety boundary.
    match fs::rename(&seed_path, &processing_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(SeedError::Stage(e)),
    }

    // Step 2: parse and validate the whole batch before applying anything.
    let bytes = fs::read(&processing_path).await.map_err(SeedError::Stage)?;
    let entries: Vec<SeedEntry> = serde_json::from_slice(&bytes).map_err(SeedError::Parse)?;

    let mut validated = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let text = entry.question_text.trim().to_string();
        if text.is_empty() {
            return Err(SeedError::InvalidEntry {
                index,
                reason: "question text must not be empty".to_string(),
            });
        }
        let options = normalize_options(entry.answer_options).map_err(|e| match e {
            DomainError::Validation(reason) => SeedError::InvalidEntry { index, reason },
            other => SeedError::InvalidEntry {
                index,
                reason: other.to_string(),
            },
        })?;
        validated.push((text, options, entry.note));
    }

    // Step 3: append under the questions lock, skipping duplicates by exact
    // question text (against existing questions and earlier batch entries).
    let guard = store.questions.lock().await;
    let mut questions = guard.load_or_default().await?;
    let mut appended = 0;

    for (text, options, note) in validated {
        if questions.iter().any(|q| q.question_text == text) {
            tracing::info!(question_text = %text, "Skipping duplicate seed question");
            continue;
        }
        questions.push(Question::new(
            Uuid::new_v4().to_string(),
            text,
            options,
            note,
        ));
        appended += 1;
    }

    guard.store(&questions).await?;
    drop(guard);

    // Step 4: the batch is applied; the staged file has served its purpose.
    fs::remove_file(&processing_path)
        .await
        .map_err(SeedError::Stage)?;

    Ok(appended)
}
