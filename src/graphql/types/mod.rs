pub mod answer;
pub mod book;
pub mod category;
pub mod question;
pub mod quiz;

pub use answer::Answer;
pub use book::Book;
pub use category::Category;
pub use question::Question;
pub use quiz::Quiz;
