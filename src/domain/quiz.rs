use super::check_max_len;
use crate::error::{ApiError, Result};
use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CATEGORY_NAME_MAX_LEN: usize = 100;
pub const QUIZ_TITLE_MAX_LEN: usize = 100;
pub const QUESTION_TITLE_MAX_LEN: usize = 255;
pub const ANSWER_TEXT_MAX_LEN: usize = 255;

/// How a question is answered. Stored as its numeric code.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[graphql(name = "QuestionType")]
pub enum QuestionType {
    /// Multiple Choice
    #[default]
    MultipleChoice,
}

impl QuestionType {
    pub fn code(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "0",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "0" => Ok(QuestionType::MultipleChoice),
            other => Err(ApiError::InvalidChoice {
                field: "technique",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[graphql(name = "Difficulty")]
pub enum Difficulty {
    /// Fundamental
    #[default]
    Fundamental,
    /// Beginner
    Beginner,
    /// Intermediate
    Intermediate,
    /// Advance
    Advance,
    /// Expert
    Expert,
}

impl Difficulty {
    pub fn code(&self) -> &'static str {
        match self {
            Difficulty::Fundamental => "0",
            Difficulty::Beginner => "1",
            Difficulty::Intermediate => "2",
            Difficulty::Advance => "3",
            Difficulty::Expert => "4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Fundamental => "Fundamental",
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advance => "Advance",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "0" => Ok(Difficulty::Fundamental),
            "1" => Ok(Difficulty::Beginner),
            "2" => Ok(Difficulty::Intermediate),
            "3" => Ok(Difficulty::Advance),
            "4" => Ok(Difficulty::Expert),
            other => Err(ApiError::InvalidChoice {
                field: "difficulty",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_max_len("Category", "name", &self.name, CATEGORY_NAME_MAX_LEN)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Option<i64>,
    pub title: String,
    pub category_id: i64,
    /// Set once when the quiz is created
    pub date_created: DateTime<Utc>,
}

impl Quiz {
    pub fn new(title: impl Into<String>, category_id: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            category_id,
            date_created: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_max_len("Quiz", "title", &self.title, QUIZ_TITLE_MAX_LEN)
    }
}

impl fmt::Display for Quiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<i64>,
    pub quiz_id: i64,
    pub technique: QuestionType,
    pub title: String,
    pub difficulty: Difficulty,
    /// Set once when the question is created
    pub date_created: DateTime<Utc>,
    pub is_active: bool,
}

impl Question {
    pub fn new(title: impl Into<String>, quiz_id: i64) -> Self {
        Self {
            id: None,
            quiz_id,
            technique: QuestionType::default(),
            title: title.into(),
            difficulty: Difficulty::default(),
            date_created: Utc::now(),
            is_active: true,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_max_len("Question", "title", &self.title, QUESTION_TITLE_MAX_LEN)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// One candidate answer. Any number of a question's answers may be right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Option<i64>,
    pub question_id: i64,
    pub answer_text: String,
    pub is_right: bool,
}

impl Answer {
    pub fn new(answer_text: impl Into<String>, question_id: i64) -> Self {
        Self {
            id: None,
            question_id,
            answer_text: answer_text.into(),
            is_right: false,
        }
    }

    pub fn right(mut self) -> Self {
        self.is_right = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_max_len("Answer", "answer_text", &self.answer_text, ANSWER_TEXT_MAX_LEN)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.answer_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_defaults() {
        let q = Question::new("2+2?", 1);
        assert_eq!(q.technique, QuestionType::MultipleChoice);
        assert_eq!(q.difficulty, Difficulty::Fundamental);
        assert!(q.is_active);
        assert!(q.id.is_none());
    }

    #[test]
    fn answer_defaults_to_wrong() {
        let a = Answer::new("5", 1);
        assert!(!a.is_right);
        assert!(a.right().is_right);
    }

    #[test]
    fn difficulty_codes_round_trip_through_storage_form() {
        for d in [
            Difficulty::Fundamental,
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advance,
            Difficulty::Expert,
        ] {
            assert_eq!(Difficulty::from_code(d.code()).unwrap(), d);
        }
        assert_eq!(Difficulty::Advance.label(), "Advance");
    }

    #[test]
    fn unknown_choice_codes_are_rejected() {
        assert!(matches!(
            Difficulty::from_code("9"),
            Err(ApiError::InvalidChoice { field: "difficulty", .. })
        ));
        assert!(matches!(
            QuestionType::from_code("1"),
            Err(ApiError::InvalidChoice { field: "technique", .. })
        ));
        assert_eq!(QuestionType::MultipleChoice.label(), "Multiple Choice");
    }

    #[test]
    fn question_title_allows_255_characters() {
        let ok = Question::new("q".repeat(QUESTION_TITLE_MAX_LEN), 1);
        assert!(ok.validate().is_ok());
        let too_long = Question::new("q".repeat(QUESTION_TITLE_MAX_LEN + 1), 1);
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn display_uses_human_readable_field() {
        assert_eq!(Category::new("Math").to_string(), "Math");
        assert_eq!(Quiz::new("Algebra", 1).to_string(), "Algebra");
        assert_eq!(Answer::new("4", 1).to_string(), "4");
    }
}
