use crate::domain::{Category, Question, Quiz};
use crate::storage::Storage;
use async_graphql::dataloader::{DataLoader, Loader};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// DataLoader for batching category lookups behind `Quiz.category`
pub struct CategoryLoader {
    storage: Arc<dyn Storage>,
}

impl CategoryLoader {
    pub fn new(storage: Arc<dyn Storage>) -> DataLoader<Self> {
        DataLoader::new(Self { storage }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<i64> for CategoryLoader {
    type Value = Category;
    type Error = String;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let categories = self
            .storage
            .get_categories_by_ids(keys)
            .await
            .map_err(|e| e.to_string())?;

        Ok(categories
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c)))
            .collect())
    }
}

/// DataLoader for batching quiz lookups behind `Question.quiz`
pub struct QuizLoader {
    storage: Arc<dyn Storage>,
}

impl QuizLoader {
    pub fn new(storage: Arc<dyn Storage>) -> DataLoader<Self> {
        DataLoader::new(Self { storage }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<i64> for QuizLoader {
    type Value = Quiz;
    type Error = String;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let quizzes = self
            .storage
            .get_quizzes_by_ids(keys)
            .await
            .map_err(|e| e.to_string())?;

        Ok(quizzes
            .into_iter()
            .filter_map(|q| q.id.map(|id| (id, q)))
            .collect())
    }
}

/// DataLoader for batching question lookups behind `Answer.question`
pub struct QuestionLoader {
    storage: Arc<dyn Storage>,
}

impl QuestionLoader {
    pub fn new(storage: Arc<dyn Storage>) -> DataLoader<Self> {
        DataLoader::new(Self { storage }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<i64> for QuestionLoader {
    type Value = Question;
    type Error = String;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let questions = self
            .storage
            .get_questions_by_ids(keys)
            .await
            .map_err(|e| e.to_string())?;

        Ok(questions
            .into_iter()
            .filter_map(|q| q.id.map(|id| (id, q)))
            .collect())
    }
}
