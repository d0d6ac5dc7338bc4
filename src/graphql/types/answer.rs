use crate::domain::Answer as DomainAnswer;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of an Answer
#[derive(Clone)]
pub struct Answer {
    pub inner: DomainAnswer,
}

impl From<DomainAnswer> for Answer {
    fn from(answer: DomainAnswer) -> Self {
        Self { inner: answer }
    }
}

#[Object]
impl Answer {
    /// The unique identifier for the answer
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The question this answer belongs to
    async fn question(&self, ctx: &Context<'_>) -> FieldResult<super::question::Question> {
        let context = ctx.data::<GraphQLContext>()?;
        let question_id = self.inner.question_id;

        match context.question_loader.load_one(question_id).await? {
            Some(question) => Ok(question.into()),
            None => Err(format!("Question {question_id} not found").into()),
        }
    }

    async fn answer_text(&self) -> &str {
        &self.inner.answer_text
    }

    /// Whether this answer is a correct one
    async fn is_right(&self) -> bool {
        self.inner.is_right
    }
}
