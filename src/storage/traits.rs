use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the catalog tables. This is all the query layer sees.
#[async_trait]
pub trait Storage: Send + Sync {
    // Full-table reads, in the store's default order
    async fn get_all_books(&self) -> Result<Vec<Book>>;
    async fn get_all_categories(&self) -> Result<Vec<Category>>;
    async fn get_all_quizzes(&self) -> Result<Vec<Quiz>>;
    async fn get_all_questions(&self) -> Result<Vec<Question>>;
    async fn get_all_answers(&self) -> Result<Vec<Answer>>;

    // Batch lookups used to follow foreign keys
    async fn get_categories_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>>;
    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>>;
    async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>>;
}

/// Administrative data entry. Creates validate field lengths and check that the
/// referenced parent row exists; a pre-set `id` is kept, otherwise one is
/// assigned. Deletes cascade to every dependent row and report whether the
/// row existed.
#[async_trait]
pub trait AdminStorage: Storage {
    async fn create_book(&self, book: &mut Book) -> Result<()>;
    async fn create_category(&self, category: &mut Category) -> Result<()>;
    async fn create_quiz(&self, quiz: &mut Quiz) -> Result<()>;
    async fn create_question(&self, question: &mut Question) -> Result<()>;
    async fn create_answer(&self, answer: &mut Answer) -> Result<()>;

    async fn delete_book(&self, id: i64) -> Result<bool>;
    async fn delete_category(&self, id: i64) -> Result<bool>;
    async fn delete_quiz(&self, id: i64) -> Result<bool>;
    async fn delete_question(&self, id: i64) -> Result<bool>;
    async fn delete_answer(&self, id: i64) -> Result<bool>;

    // Writes between begin and commit land together; rollback discards them
    async fn begin_batch(&self) -> Result<()>;
    async fn commit_batch(&self) -> Result<()>;
    async fn rollback_batch(&self) -> Result<()>;
}
