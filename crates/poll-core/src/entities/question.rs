//! Question entity - a poll question with its declared answer options

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A single answer option declared on a question
///
/// The optional emoji is presenter-side decoration and is stripped from
/// audience payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl AnswerOption {
    /// Create an option with no emoji
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emoji: None,
        }
    }

    /// Create an option with an emoji
    pub fn with_emoji(text: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emoji: Some(emoji.into()),
        }
    }
}

/// Question entity
///
/// At most one question has `is_active == true` system-wide; the record
/// store's publish operation maintains that invariant. `already_published`
/// is monotonic: once true it is never reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub answer_options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub is_locked: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "alreadyPublished", default)]
    pub already_published: bool,
}

impl Question {
    /// Create a fresh, unpublished question
    ///
    /// Options are expected to have been run through [`normalize_options`]
    /// already.
    pub fn new(
        id: String,
        question_text: String,
        answer_options: Vec<AnswerOption>,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            question_text,
            answer_options,
            note,
            is_locked: false,
            is_active: false,
            created_at: Utc::now(),
            already_published: false,
        }
    }

    /// Check whether `selected` exactly matches a declared option text
    pub fn has_option(&self, selected: &str) -> bool {
        self.answer_options.iter().any(|o| o.text == selected)
    }

    /// Resolve a selection to the canonical declared option text,
    /// ignoring ASCII case
    ///
    /// This is the boundary-side normalization; the record store itself
    /// only accepts exact matches.
    pub fn resolve_option(&self, selected: &str) -> Option<&str> {
        self.answer_options
            .iter()
            .find(|o| o.text.eq_ignore_ascii_case(selected))
            .map(|o| o.text.as_str())
    }

    /// Iterator over the declared option texts
    pub fn option_texts(&self) -> impl Iterator<Item = &str> {
        self.answer_options.iter().map(|o| o.text.as_str())
    }
}

/// The audience-facing view of a question
///
/// Presenter notes and option emojis are stripped; options flatten to their
/// texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceQuestion {
    pub id: String,
    pub question_text: String,
    pub answer_options: Vec<String>,
    pub is_locked: bool,
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "alreadyPublished")]
    pub already_published: bool,
}

impl From<&Question> for AudienceQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            question_text: question.question_text.clone(),
            answer_options: question.option_texts().map(String::from).collect(),
            is_locked: question.is_locked,
            is_active: question.is_active,
            created_at: question.created_at,
            already_published: question.already_published,
        }
    }
}

/// Normalize a declared option list for question creation or seed ingestion
///
/// Trims every text, drops entries that are empty after trimming, drops
/// exact duplicates (first occurrence wins), and requires at least two
/// remaining options.
pub fn normalize_options(options: Vec<AnswerOption>) -> Result<Vec<AnswerOption>, DomainError> {
    let mut normalized: Vec<AnswerOption> = Vec::with_capacity(options.len());

    for mut option in options {
        option.text = option.text.trim().to_string();
        if option.text.is_empty() {
            continue;
        }
        if normalized.iter().any(|o| o.text == option.text) {
            continue;
        }
        normalized.push(option);
    }

    if normalized.len() < 2 {
        return Err(DomainError::Validation(
            "at least 2 distinct non-empty answer options required".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: &[&str]) -> Vec<AnswerOption> {
        texts.iter().map(|t| AnswerOption::new(*t)).collect()
    }

    #[test]
    fn test_normalize_trims_and_drops_empties() {
        let normalized = normalize_options(options(&["  A ", "", "  ", "B"])).unwrap();
        assert_eq!(
            normalized.iter().map(|o| o.text.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_normalize_drops_duplicates_first_wins() {
        let mut opts = options(&["A", "B"]);
        opts.push(AnswerOption::with_emoji("A", "🅰️"));
        let normalized = normalize_options(opts).unwrap();
        assert_eq!(normalized.len(), 2);
        assert!(normalized[0].emoji.is_none());
    }

    #[test]
    fn test_normalize_requires_two_distinct() {
        assert!(normalize_options(options(&["A", "a "])).is_ok());
        assert!(normalize_options(options(&["A", "A"])).is_err());
        assert!(normalize_options(options(&["A"])).is_err());
        assert!(normalize_options(Vec::new()).is_err());
    }

    #[test]
    fn test_resolve_option_is_case_insensitive() {
        let question = Question::new(
            "q1".to_string(),
            "Pick one".to_string(),
            options(&["Alpha", "Beta"]),
            None,
        );
        assert_eq!(question.resolve_option("alpha"), Some("Alpha"));
        assert_eq!(question.resolve_option("BETA"), Some("Beta"));
        assert_eq!(question.resolve_option("gamma"), None);
        assert!(question.has_option("Alpha"));
        assert!(!question.has_option("alpha"));
    }

    #[test]
    fn test_audience_view_strips_note_and_emojis() {
        let mut question = Question::new(
            "q1".to_string(),
            "Pick one".to_string(),
            vec![
                AnswerOption::with_emoji("Alpha", "🌊"),
                AnswerOption::new("Beta"),
            ],
            Some("presenter note".to_string()),
        );
        question.is_active = true;

        let view = AudienceQuestion::from(&question);
        assert_eq!(view.answer_options, vec!["Alpha", "Beta"]);
        assert!(view.is_active);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("note").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_question_serialized_field_names() {
        let question = Question::new(
            "q1".to_string(),
            "Pick one".to_string(),
            options(&["A", "B"]),
            None,
        );
        let json = serde_json::to_value(&question).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json.get("alreadyPublished"), Some(&serde_json::json!(false)));
        assert_eq!(json.get("is_locked"), Some(&serde_json::json!(false)));
    }
}
