//! Answer entity - one participant's vote on a question

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer entity
///
/// At most one answer exists per `(question_id, user_id)`; resubmission
/// overwrites the selection and timestamp in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub question_id: String,
    pub user_id: String,
    pub user_nickname: String,
    pub selected_answer: String,
    pub timestamp: DateTime<Utc>,
}

impl Answer {
    /// Create a fresh answer row
    pub fn new(
        id: String,
        question_id: String,
        user_id: String,
        user_nickname: String,
        selected_answer: String,
    ) -> Self {
        Self {
            id,
            question_id,
            user_id,
            user_nickname,
            selected_answer,
            timestamp: Utc::now(),
        }
    }

    /// Overwrite the selection in place, refreshing the timestamp
    pub fn reselect(&mut self, selected_answer: String) {
        self.selected_answer = selected_answer;
        self.timestamp = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reselect_updates_selection_and_timestamp() {
        let mut answer = Answer::new(
            "a1".to_string(),
            "q1".to_string(),
            "u1".to_string(),
            "nick".to_string(),
            "A".to_string(),
        );
        let first = answer.timestamp;

        answer.reselect("B".to_string());
        assert_eq!(answer.selected_answer, "B");
        assert!(answer.timestamp >= first);
        assert_eq!(answer.id, "a1");
    }
}
