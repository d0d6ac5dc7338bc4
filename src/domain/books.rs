use super::check_max_len;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOOK_TITLE_MAX_LEN: usize = 100;
pub const BOOK_AUTHOR_MAX_LEN: usize = 100;

/// A catalog entry in the Books domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_max_len("Book", "title", &self.title, BOOK_TITLE_MAX_LEN)?;
        check_max_len("Book", "author", &self.author, BOOK_AUTHOR_MAX_LEN)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
