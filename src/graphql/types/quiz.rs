use crate::domain::Quiz as DomainQuiz;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of a Quiz
#[derive(Clone)]
pub struct Quiz {
    pub inner: DomainQuiz,
}

impl From<DomainQuiz> for Quiz {
    fn from(quiz: DomainQuiz) -> Self {
        Self { inner: quiz }
    }
}

#[Object]
impl Quiz {
    /// The unique identifier for the quiz
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The title of the quiz
    async fn title(&self) -> &str {
        &self.inner.title
    }

    /// The category this quiz belongs to
    async fn category(&self, ctx: &Context<'_>) -> FieldResult<super::category::Category> {
        let context = ctx.data::<GraphQLContext>()?;
        let category_id = self.inner.category_id;

        match context.category_loader.load_one(category_id).await? {
            Some(category) => Ok(category.into()),
            None => Err(format!("Category {category_id} not found").into()),
        }
    }

    /// When the quiz was created
    async fn date_created(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.date_created
    }
}
