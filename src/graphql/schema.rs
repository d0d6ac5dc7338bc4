use crate::graphql::loaders::{CategoryLoader, QuestionLoader, QuizLoader};
use crate::graphql::resolvers::Query;
use crate::storage::Storage;
use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use std::sync::Arc;

/// GraphQL context containing shared application state
pub struct GraphQLContext {
    pub storage: Arc<dyn Storage>,
    pub category_loader: DataLoader<CategoryLoader>,
    pub quiz_loader: DataLoader<QuizLoader>,
    pub question_loader: DataLoader<QuestionLoader>,
}

/// The complete GraphQL schema. Read-only: there is no mutation root.
pub type GraphQLSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Create a new GraphQL schema with the given storage
pub fn create_schema(storage: Arc<dyn Storage>) -> GraphQLSchema {
    let category_loader = CategoryLoader::new(storage.clone());
    let quiz_loader = QuizLoader::new(storage.clone());
    let question_loader = QuestionLoader::new(storage.clone());

    Schema::build(Query, EmptyMutation, EmptySubscription)
        .data(GraphQLContext {
            storage,
            category_loader,
            quiz_loader,
            question_loader,
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, QuestionType};
    use crate::storage::InMemoryStorage;

    #[test]
    fn sdl_exposes_only_the_five_list_fields() {
        let schema = create_schema(Arc::new(InMemoryStorage::new()));
        let sdl = schema.sdl();
        for field in [
            "allBooks: [Book!]!",
            "allCategories: [Category!]!",
            "allQuizzes: [Quiz!]!",
            "allQuestions: [Question!]!",
            "allAnswers: [Answer!]!",
        ] {
            assert!(sdl.contains(field), "missing {field} in:\n{sdl}");
        }
        assert!(!sdl.contains("type Mutation"));
        assert!(sdl.contains("type: QuestionType!"));
        assert!(!sdl.contains("technique"));
    }

    #[test]
    fn choice_labels_describe_enum_values() {
        let sdl = create_schema(Arc::new(InMemoryStorage::new())).sdl();
        for label in [
            QuestionType::MultipleChoice.label(),
            Difficulty::Fundamental.label(),
            Difficulty::Advance.label(),
            Difficulty::Expert.label(),
        ] {
            assert!(sdl.contains(label), "no description {label:?} in:\n{sdl}");
        }
    }
}
