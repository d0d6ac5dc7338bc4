use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Answer, Book, Category, Question, Quiz};
use crate::observability::metrics;
use async_graphql::{Context, FieldResult, Object};

/// Root query object for GraphQL.
///
/// Every field takes no arguments and returns every row of one table, in the
/// store's default order.
pub struct Query;

#[Object]
impl Query {
    /// Get all books
    async fn all_books(&self, ctx: &Context<'_>) -> FieldResult<Vec<Book>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.storage.get_all_books().await {
            Ok(books) => {
                metrics::storage::table_read("allBooks", books.len());
                Ok(books.into_iter().map(|b| b.into()).collect())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get all quiz categories
    async fn all_categories(&self, ctx: &Context<'_>) -> FieldResult<Vec<Category>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.storage.get_all_categories().await {
            Ok(categories) => {
                metrics::storage::table_read("allCategories", categories.len());
                Ok(categories.into_iter().map(|c| c.into()).collect())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get all quizzes
    async fn all_quizzes(&self, ctx: &Context<'_>) -> FieldResult<Vec<Quiz>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.storage.get_all_quizzes().await {
            Ok(quizzes) => {
                metrics::storage::table_read("allQuizzes", quizzes.len());
                Ok(quizzes.into_iter().map(|q| q.into()).collect())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get all questions, active or not
    async fn all_questions(&self, ctx: &Context<'_>) -> FieldResult<Vec<Question>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.storage.get_all_questions().await {
            Ok(questions) => {
                metrics::storage::table_read("allQuestions", questions.len());
                Ok(questions.into_iter().map(|q| q.into()).collect())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get all answers
    async fn all_answers(&self, ctx: &Context<'_>) -> FieldResult<Vec<Answer>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.storage.get_all_answers().await {
            Ok(answers) => {
                metrics::storage::table_read("allAnswers", answers.len());
                Ok(answers.into_iter().map(|a| a.into()).collect())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain;
    use crate::error::{ApiError, Result};
    use crate::graphql::create_schema;
    use crate::storage::{AdminStorage, InMemoryStorage, Storage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    /// Storage whose every read fails, as if the database were unreachable
    struct UnreachableStorage;

    #[async_trait]
    impl Storage for UnreachableStorage {
        async fn get_all_books(&self) -> Result<Vec<domain::Book>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_all_categories(&self) -> Result<Vec<domain::Category>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_all_quizzes(&self) -> Result<Vec<domain::Quiz>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_all_questions(&self) -> Result<Vec<domain::Question>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_all_answers(&self) -> Result<Vec<domain::Answer>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_categories_by_ids(&self, _ids: &[i64]) -> Result<Vec<domain::Category>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_quizzes_by_ids(&self, _ids: &[i64]) -> Result<Vec<domain::Quiz>> {
            Err(ApiError::Config("database unreachable".into()))
        }
        async fn get_questions_by_ids(&self, _ids: &[i64]) -> Result<Vec<domain::Question>> {
            Err(ApiError::Config("database unreachable".into()))
        }
    }

    #[tokio::test]
    async fn empty_tables_resolve_to_empty_lists() {
        let schema = create_schema(Arc::new(InMemoryStorage::new()));
        let res = schema
            .execute("{ allBooks { id } allQuestions { id } allAnswers { id } }")
            .await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        assert_eq!(
            res.data.into_json().unwrap(),
            json!({ "allBooks": [], "allQuestions": [], "allAnswers": [] })
        );
    }

    #[tokio::test]
    async fn store_failures_surface_as_execution_errors() {
        let schema = create_schema(Arc::new(UnreachableStorage));
        let res = schema.execute("{ allBooks { id } }").await;
        assert_eq!(res.errors.len(), 1);
        assert!(res.errors[0].message.contains("database unreachable"));
    }

    #[tokio::test]
    async fn books_expose_exactly_their_allowlisted_fields() {
        let storage = Arc::new(InMemoryStorage::new());
        for (title, author) in [("Dune", "Frank Herbert"), ("Emma", "Jane Austen")] {
            let mut book = domain::Book::new(title, author);
            storage.create_book(&mut book).await.unwrap();
        }
        let schema = create_schema(storage);

        let res = schema.execute("{ allBooks { id title author } }").await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        assert_eq!(
            res.data.into_json().unwrap(),
            json!({ "allBooks": [
                { "id": "1", "title": "Dune", "author": "Frank Herbert" },
                { "id": "2", "title": "Emma", "author": "Jane Austen" }
            ]})
        );
    }
}
