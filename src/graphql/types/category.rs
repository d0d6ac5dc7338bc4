use crate::domain::Category as DomainCategory;
use async_graphql::{Object, ID};

/// GraphQL representation of a quiz Category
#[derive(Clone)]
pub struct Category {
    pub inner: DomainCategory,
}

impl From<DomainCategory> for Category {
    fn from(category: DomainCategory) -> Self {
        Self { inner: category }
    }
}

#[Object]
impl Category {
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }
}
