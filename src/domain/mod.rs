// Entity shapes for the Books catalog and the Quiz domain

pub mod books;
pub mod quiz;

pub use books::Book;
pub use quiz::{Answer, Category, Difficulty, Question, QuestionType, Quiz};

use crate::error::{ApiError, Result};

/// Checks a text column against its maximum length, counted in characters.
pub(crate) fn check_max_len(
    entity: &'static str,
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(ApiError::Validation {
            entity,
            field,
            message: format!("ensure this value has at most {max} characters (it has {len})"),
        });
    }
    Ok(())
}
