use super::traits::{AdminStorage, Storage};
use crate::domain::*;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default, Clone)]
struct Tables {
    books: BTreeMap<i64, Book>,
    categories: BTreeMap<i64, Category>,
    quizzes: BTreeMap<i64, Quiz>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    // Highest id ever used per table, like an AUTOINCREMENT sequence
    last_ids: HashMap<&'static str, i64>,
}

impl Tables {
    /// Keeps a supplied id, otherwise hands out the table's next one
    fn assign_id(&mut self, table: &'static str, requested: Option<i64>) -> i64 {
        let last = self.last_ids.entry(table).or_insert(0);
        match requested {
            Some(id) => {
                *last = (*last).max(id);
                id
            }
            None => {
                *last += 1;
                *last
            }
        }
    }

    fn cascade_question(&mut self, question_id: i64) {
        self.answers.retain(|_, a| a.question_id != question_id);
    }

    fn cascade_quiz(&mut self, quiz_id: i64) {
        let question_ids: Vec<i64> = self
            .questions
            .iter()
            .filter(|(_, q)| q.quiz_id == quiz_id)
            .map(|(id, _)| *id)
            .collect();
        for id in question_ids {
            self.questions.remove(&id);
            self.cascade_question(id);
        }
    }

    fn cascade_category(&mut self, category_id: i64) {
        let quiz_ids: Vec<i64> = self
            .quizzes
            .iter()
            .filter(|(_, q)| q.category_id == category_id)
            .map(|(id, _)| *id)
            .collect();
        for id in quiz_ids {
            self.quizzes.remove(&id);
            self.cascade_quiz(id);
        }
    }
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
    // Copy taken at begin_batch, restored on rollback
    snapshot: Mutex<Option<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| ApiError::LockPoisoned)
    }

    fn snapshot(&self) -> Result<MutexGuard<'_, Option<Tables>>> {
        self.snapshot.lock().map_err(|_| ApiError::LockPoisoned)
    }
}

fn pick<T: Clone>(table: &BTreeMap<i64, T>, ids: &[i64]) -> Vec<T> {
    ids.iter().filter_map(|id| table.get(id).cloned()).collect()
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_all_books(&self) -> Result<Vec<Book>> {
        Ok(self.tables()?.books.values().cloned().collect())
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>> {
        Ok(self.tables()?.categories.values().cloned().collect())
    }

    async fn get_all_quizzes(&self) -> Result<Vec<Quiz>> {
        Ok(self.tables()?.quizzes.values().cloned().collect())
    }

    async fn get_all_questions(&self) -> Result<Vec<Question>> {
        Ok(self.tables()?.questions.values().cloned().collect())
    }

    async fn get_all_answers(&self) -> Result<Vec<Answer>> {
        Ok(self.tables()?.answers.values().cloned().collect())
    }

    async fn get_categories_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>> {
        Ok(pick(&self.tables()?.categories, ids))
    }

    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>> {
        Ok(pick(&self.tables()?.quizzes, ids))
    }

    async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>> {
        Ok(pick(&self.tables()?.questions, ids))
    }
}

#[async_trait]
impl AdminStorage for InMemoryStorage {
    async fn create_book(&self, book: &mut Book) -> Result<()> {
        book.validate()?;
        let mut tables = self.tables()?;
        let id = tables.assign_id("books", book.id);
        book.id = Some(id);
        tables.books.insert(id, book.clone());

        debug!("Created book: {} with id {}", book, id);
        Ok(())
    }

    async fn create_category(&self, category: &mut Category) -> Result<()> {
        category.validate()?;
        let mut tables = self.tables()?;
        let id = tables.assign_id("categories", category.id);
        category.id = Some(id);
        tables.categories.insert(id, category.clone());

        debug!("Created category: {} with id {}", category, id);
        Ok(())
    }

    async fn create_quiz(&self, quiz: &mut Quiz) -> Result<()> {
        quiz.validate()?;
        let mut tables = self.tables()?;
        if !tables.categories.contains_key(&quiz.category_id) {
            return Err(ApiError::MissingReference {
                entity: "Category",
                id: quiz.category_id,
            });
        }
        let id = tables.assign_id("quizzes", quiz.id);
        quiz.id = Some(id);
        if let Some(existing) = tables.quizzes.get(&id) {
            quiz.date_created = existing.date_created;
        }
        tables.quizzes.insert(id, quiz.clone());

        debug!("Created quiz: {} with id {}", quiz, id);
        Ok(())
    }

    async fn create_question(&self, question: &mut Question) -> Result<()> {
        question.validate()?;
        let mut tables = self.tables()?;
        if !tables.quizzes.contains_key(&question.quiz_id) {
            return Err(ApiError::MissingReference {
                entity: "Quiz",
                id: question.quiz_id,
            });
        }
        let id = tables.assign_id("questions", question.id);
        question.id = Some(id);
        if let Some(existing) = tables.questions.get(&id) {
            question.date_created = existing.date_created;
        }
        tables.questions.insert(id, question.clone());

        debug!(
            "Created question: {} ({}, {}) with id {}",
            question, question.technique, question.difficulty, id
        );
        Ok(())
    }

    async fn create_answer(&self, answer: &mut Answer) -> Result<()> {
        answer.validate()?;
        let mut tables = self.tables()?;
        if !tables.questions.contains_key(&answer.question_id) {
            return Err(ApiError::MissingReference {
                entity: "Question",
                id: answer.question_id,
            });
        }
        let id = tables.assign_id("answers", answer.id);
        answer.id = Some(id);
        tables.answers.insert(id, answer.clone());

        debug!("Created answer: {} with id {}", answer, id);
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> Result<bool> {
        Ok(self.tables()?.books.remove(&id).is_some())
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables()?;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cascade_category(id);
        debug!("Deleted category {} and its dependents", id);
        Ok(true)
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables()?;
        if tables.quizzes.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cascade_quiz(id);
        debug!("Deleted quiz {} and its dependents", id);
        Ok(true)
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables()?;
        if tables.questions.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cascade_question(id);
        Ok(true)
    }

    async fn delete_answer(&self, id: i64) -> Result<bool> {
        Ok(self.tables()?.answers.remove(&id).is_some())
    }

    async fn begin_batch(&self) -> Result<()> {
        let saved = self.tables()?.clone();
        *self.snapshot()? = Some(saved);
        Ok(())
    }

    async fn commit_batch(&self) -> Result<()> {
        self.snapshot()?.take();
        Ok(())
    }

    async fn rollback_batch(&self) -> Result<()> {
        let saved = self.snapshot()?.take();
        if let Some(saved) = saved {
            *self.tables()? = saved;
            debug!("Rolled back batch");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_tables_read_as_empty_lists() {
        let storage = InMemoryStorage::new();
        assert!(storage.get_all_books().await.unwrap().is_empty());
        assert!(storage.get_all_questions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quiz_requires_existing_category() {
        let storage = InMemoryStorage::new();
        let mut quiz = Quiz::new("Algebra", 42);
        let err = storage.create_quiz(&mut quiz).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingReference { entity: "Category", id: 42 }
        ));
        assert!(storage.get_all_quizzes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn supplied_ids_are_kept_and_later_ids_follow_them() {
        let storage = InMemoryStorage::new();
        let mut first = Category {
            id: Some(10),
            name: "Math".into(),
        };
        storage.create_category(&mut first).await.unwrap();
        let mut second = Category::new("Science");
        storage.create_category(&mut second).await.unwrap();
        assert_eq!(first.id, Some(10));
        assert_eq!(second.id, Some(11));
    }

    #[tokio::test]
    async fn each_table_counts_its_own_ids() {
        let storage = InMemoryStorage::new();
        let mut book = Book::new("Dune", "Frank Herbert");
        storage.create_book(&mut book).await.unwrap();
        let mut math = Category::new("Math");
        storage.create_category(&mut math).await.unwrap();
        let mut quiz = Quiz::new("Algebra", math.id.unwrap());
        storage.create_quiz(&mut quiz).await.unwrap();
        assert_eq!(book.id, Some(1));
        assert_eq!(math.id, Some(1));
        assert_eq!(quiz.id, Some(1));

        let mut deleted = Book::new("Emma", "Jane Austen");
        storage.create_book(&mut deleted).await.unwrap();
        storage.delete_book(2).await.unwrap();
        let mut next = Book::new("Ulysses", "James Joyce");
        storage.create_book(&mut next).await.unwrap();
        assert_eq!(next.id, Some(3));
    }

    #[tokio::test]
    async fn rollback_restores_the_tables_from_batch_start() {
        let storage = InMemoryStorage::new();
        let mut kept = Category::new("Math");
        storage.create_category(&mut kept).await.unwrap();

        storage.begin_batch().await.unwrap();
        let mut dropped = Category::new("Art");
        storage.create_category(&mut dropped).await.unwrap();
        storage.delete_category(kept.id.unwrap()).await.unwrap();
        storage.rollback_batch().await.unwrap();

        assert_eq!(storage.get_all_categories().await.unwrap(), vec![kept]);
        let mut after = Category::new("Music");
        storage.create_category(&mut after).await.unwrap();
        assert_eq!(after.id, Some(2));
    }

    #[tokio::test]
    async fn committed_batches_stay_written() {
        let storage = InMemoryStorage::new();
        storage.begin_batch().await.unwrap();
        let mut math = Category::new("Math");
        storage.create_category(&mut math).await.unwrap();
        storage.commit_batch().await.unwrap();
        storage.rollback_batch().await.unwrap();
        assert_eq!(storage.get_all_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_category_cascades_transitively() {
        let storage = InMemoryStorage::new();
        let mut math = Category::new("Math");
        storage.create_category(&mut math).await.unwrap();
        let mut art = Category::new("Art");
        storage.create_category(&mut art).await.unwrap();

        for title in ["Algebra", "Geometry"] {
            let mut quiz = Quiz::new(title, math.id.unwrap());
            storage.create_quiz(&mut quiz).await.unwrap();
            let mut question = Question::new("?", quiz.id.unwrap());
            storage.create_question(&mut question).await.unwrap();
            let mut answer = Answer::new("!", question.id.unwrap());
            storage.create_answer(&mut answer).await.unwrap();
        }
        let mut kept = Quiz::new("Painting", art.id.unwrap());
        storage.create_quiz(&mut kept).await.unwrap();

        assert!(storage.delete_category(math.id.unwrap()).await.unwrap());

        let quizzes = storage.get_all_quizzes().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].title, "Painting");
        assert!(storage.get_all_questions().await.unwrap().is_empty());
        assert!(storage.get_all_answers().await.unwrap().is_empty());
        assert!(!storage.delete_category(math.id.unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn batch_lookup_skips_unknown_ids() {
        let storage = InMemoryStorage::new();
        let mut math = Category::new("Math");
        storage.create_category(&mut math).await.unwrap();
        let found = storage
            .get_categories_by_ids(&[math.id.unwrap(), 999])
            .await
            .unwrap();
        assert_eq!(found, vec![math]);
    }
}
