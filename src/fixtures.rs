//! Administrative data loading from fixture files.
//!
//! A fixture is a JSON array of records in the `model`/`pk`/`fields` layout:
//!
//! ```json
//! [
//!   {"model": "quiz.category", "pk": 1, "fields": {"name": "Math"}},
//!   {"model": "quiz.quizzes", "pk": 1, "fields": {"title": "Algebra", "category": 1}}
//! ]
//! ```
//!
//! Records are applied in file order, so parents must come before children.

use crate::domain::*;
use crate::error::{ApiError, Result};
use crate::storage::AdminStorage;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRecord {
    pub model: String,
    #[serde(default)]
    pub pk: Option<i64>,
    #[serde(default)]
    pub fields: Value,
}

/// How many rows of each model a fixture wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub books: usize,
    pub categories: usize,
    pub quizzes: usize,
    pub questions: usize,
    pub answers: usize,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.books + self.categories + self.quizzes + self.questions + self.answers
    }
}

#[derive(Deserialize)]
struct BookFields {
    title: String,
    author: String,
}

#[derive(Deserialize)]
struct CategoryFields {
    name: String,
}

#[derive(Deserialize)]
struct QuizFields {
    title: String,
    category: i64,
    #[serde(default)]
    date_created: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct QuestionFields {
    quiz: i64,
    #[serde(default)]
    technique: Option<Value>,
    title: String,
    #[serde(default)]
    difficulty: Option<Value>,
    #[serde(default)]
    date_created: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    is_active: bool,
}

#[derive(Deserialize)]
struct AnswerFields {
    question: i64,
    answer_text: String,
    #[serde(default)]
    is_right: bool,
}

fn default_true() -> bool {
    true
}

/// Choice columns may be written as `"2"` or `2`
fn choice_code(field: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ApiError::InvalidChoice {
            field,
            value: other.to_string(),
        }),
    }
}

fn fields<T: serde::de::DeserializeOwned>(record: &FixtureRecord) -> Result<T> {
    serde_json::from_value(record.fields.clone()).map_err(|e| {
        ApiError::Fixture(format!(
            "invalid fields for {} (pk {:?}): {e}",
            record.model, record.pk
        ))
    })
}

pub fn parse_fixture(json: &str) -> Result<Vec<FixtureRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Apply every record through the administrative storage interface. The
/// whole fixture is one batch: if any record fails, none of them are kept.
pub async fn load_fixture<S>(storage: &S, records: &[FixtureRecord]) -> Result<LoadSummary>
where
    S: AdminStorage + ?Sized,
{
    storage.begin_batch().await?;
    match apply_records(storage, records).await {
        Ok(summary) => {
            storage.commit_batch().await?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(rollback) = storage.rollback_batch().await {
                warn!("Failed to roll back fixture load: {}", rollback);
            }
            Err(e)
        }
    }
}

async fn apply_records<S>(storage: &S, records: &[FixtureRecord]) -> Result<LoadSummary>
where
    S: AdminStorage + ?Sized,
{
    let mut summary = LoadSummary::default();

    for record in records {
        match record.model.to_ascii_lowercase().as_str() {
            "books.books" => {
                let f: BookFields = fields(record)?;
                let mut book = Book {
                    id: record.pk,
                    title: f.title,
                    author: f.author,
                };
                storage.create_book(&mut book).await?;
                summary.books += 1;
            }
            "quiz.category" => {
                let f: CategoryFields = fields(record)?;
                let mut category = Category {
                    id: record.pk,
                    name: f.name,
                };
                storage.create_category(&mut category).await?;
                summary.categories += 1;
            }
            "quiz.quizzes" => {
                let f: QuizFields = fields(record)?;
                let mut quiz = Quiz::new(f.title, f.category);
                quiz.id = record.pk;
                if let Some(ts) = f.date_created {
                    quiz.date_created = ts;
                }
                storage.create_quiz(&mut quiz).await?;
                summary.quizzes += 1;
            }
            "quiz.questions" => {
                let f: QuestionFields = fields(record)?;
                let mut question = Question::new(f.title, f.quiz);
                question.id = record.pk;
                if let Some(v) = &f.technique {
                    question.technique = QuestionType::from_code(&choice_code("technique", v)?)?;
                }
                if let Some(v) = &f.difficulty {
                    question.difficulty = Difficulty::from_code(&choice_code("difficulty", v)?)?;
                }
                if let Some(ts) = f.date_created {
                    question.date_created = ts;
                }
                question.is_active = f.is_active;
                storage.create_question(&mut question).await?;
                summary.questions += 1;
            }
            "quiz.answer" => {
                let f: AnswerFields = fields(record)?;
                let mut answer = Answer {
                    id: record.pk,
                    question_id: f.question,
                    answer_text: f.answer_text,
                    is_right: f.is_right,
                };
                storage.create_answer(&mut answer).await?;
                summary.answers += 1;
            }
            other => {
                return Err(ApiError::Fixture(format!("unknown model {other:?}")));
            }
        }
        debug!("Loaded {} (pk {:?})", record.model, record.pk);
    }

    Ok(summary)
}

pub async fn load_fixture_file<S>(storage: &S, path: &Path) -> Result<LoadSummary>
where
    S: AdminStorage + ?Sized,
{
    let content = std::fs::read_to_string(path)?;
    let records = parse_fixture(&content)?;
    let summary = load_fixture(storage, &records).await?;
    info!(
        "Installed {} object(s) from {}",
        summary.total(),
        path.display()
    );
    Ok(summary)
}
