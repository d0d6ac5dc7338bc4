use crate::domain::{Difficulty, Question as DomainQuestion, QuestionType};
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of a Question
#[derive(Clone)]
pub struct Question {
    pub inner: DomainQuestion,
}

impl From<DomainQuestion> for Question {
    fn from(question: DomainQuestion) -> Self {
        Self { inner: question }
    }
}

#[Object]
impl Question {
    /// The unique identifier for the question
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The quiz this question belongs to
    async fn quiz(&self, ctx: &Context<'_>) -> FieldResult<super::quiz::Quiz> {
        let context = ctx.data::<GraphQLContext>()?;
        let quiz_id = self.inner.quiz_id;

        match context.quiz_loader.load_one(quiz_id).await? {
            Some(quiz) => Ok(quiz.into()),
            None => Err(format!("Quiz {quiz_id} not found").into()),
        }
    }

    /// How the question is answered
    #[graphql(name = "type")]
    async fn question_type(&self) -> QuestionType {
        self.inner.technique
    }

    /// The question text
    async fn title(&self) -> &str {
        &self.inner.title
    }

    async fn difficulty(&self) -> Difficulty {
        self.inner.difficulty
    }

    /// When the question was created
    async fn date_created(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.date_created
    }

    /// Whether the question is currently in use
    async fn is_active(&self) -> bool {
        self.inner.is_active
    }
}
