use crate::domain::Book as DomainBook;
use async_graphql::{Object, ID};

/// GraphQL representation of a Book
#[derive(Clone)]
pub struct Book {
    pub inner: DomainBook,
}

impl From<DomainBook> for Book {
    fn from(book: DomainBook) -> Self {
        Self { inner: book }
    }
}

#[Object]
impl Book {
    /// The unique identifier for the book
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// The title of the book
    async fn title(&self) -> &str {
        &self.inner.title
    }

    /// Who wrote the book
    async fn author(&self) -> &str {
        &self.inner.author
    }
}
