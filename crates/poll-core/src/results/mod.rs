//! Results aggregation - pure vote tallying
//!
//! No I/O and no side effects; everything here is derived on demand and
//! never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Answer, Question};

/// A point-in-time vote tally for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub question: Question,
    /// Count per declared option text; every declared option is present,
    /// zero-filled when unvoted
    pub results: BTreeMap<String, u64>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
}

/// A tally enriched with the live connection count for broadcasting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    pub question: Question,
    pub results: BTreeMap<String, u64>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
    #[serde(rename = "totalConnections")]
    pub total_connections: u64,
}

impl VoteTally {
    /// Attach the live connection count, producing a broadcastable snapshot
    pub fn into_snapshot(self, total_connections: u64) -> ResultsSnapshot {
        ResultsSnapshot {
            question: self.question,
            results: self.results,
            total_votes: self.total_votes,
            total_connections,
        }
    }
}

/// Aggregate answers into a vote tally for `question`
///
/// The result map is zero-initialized over every declared option text;
/// answers referencing options no longer declared are ignored.
/// `total_votes` is the number of answer rows, counting ignored ones.
pub fn aggregate(question: &Question, answers: &[Answer]) -> VoteTally {
    let mut results: BTreeMap<String, u64> = question
        .option_texts()
        .map(|text| (text.to_string(), 0))
        .collect();

    for answer in answers {
        if let Some(count) = results.get_mut(&answer.selected_answer) {
            *count += 1;
        }
    }

    VoteTally {
        question: question.clone(),
        results,
        total_votes: answers.len() as u64,
    }
}
