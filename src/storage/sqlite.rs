use super::traits::{AdminStorage, Storage};
use crate::domain::*;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const MIGRATION_SQL: &str = include_str!("../../migrations/001_create_books_and_quiz_tables.sql");

const BOOK_COLUMNS: &str = "id, title, author";
const CATEGORY_COLUMNS: &str = "id, name";
const QUIZ_COLUMNS: &str = "id, title, category_id, date_created";
const QUESTION_COLUMNS: &str =
    "id, quiz_id, technique, title, difficulty, date_created, is_active";
const ANSWER_COLUMNS: &str = "id, question_id, answer_text, is_right";

/// SQLite-backed storage. One table per entity, cascading foreign keys.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening SQLite database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Private in-process database, gone when dropped
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Cascades only fire with enforcement on, and it is per connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the tables if they do not exist yet
    pub fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");
        self.conn()?.execute_batch(MIGRATION_SQL)?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| ApiError::LockPoisoned)
    }

    fn select<T>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    fn select_by_ids<T>(
        &self,
        table: &str,
        columns: &str,
        ids: &[i64],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {columns} FROM {table} WHERE id IN ({placeholders})");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    fn delete_row(&self, table: &str, id: i64) -> Result<bool> {
        let removed = self
            .conn()?
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
        debug!("Deleted {} row(s) from {} with id {}", removed, table, id);
        Ok(removed > 0)
    }
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn require_parent(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    if row_exists(conn, table, id)? {
        Ok(())
    } else {
        Err(ApiError::MissingReference { entity, id })
    }
}

fn conversion_error(idx: usize, err: ApiError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, ApiError::Timestamp(e)))
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
    })
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    Ok(Quiz {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        category_id: row.get(2)?,
        date_created: timestamp_at(row, 3)?,
    })
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let technique: String = row.get(2)?;
    let difficulty: String = row.get(4)?;
    Ok(Question {
        id: Some(row.get(0)?),
        quiz_id: row.get(1)?,
        technique: QuestionType::from_code(&technique).map_err(|e| conversion_error(2, e))?,
        title: row.get(3)?,
        difficulty: Difficulty::from_code(&difficulty).map_err(|e| conversion_error(4, e))?,
        date_created: timestamp_at(row, 5)?,
        is_active: row.get(6)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: Some(row.get(0)?),
        question_id: row.get(1)?,
        answer_text: row.get(2)?,
        is_right: row.get(3)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_all_books(&self) -> Result<Vec<Book>> {
        self.select(
            &format!("SELECT {BOOK_COLUMNS} FROM books_books"),
            &[],
            book_from_row,
        )
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>> {
        self.select(
            &format!("SELECT {CATEGORY_COLUMNS} FROM quiz_category"),
            &[],
            category_from_row,
        )
    }

    async fn get_all_quizzes(&self) -> Result<Vec<Quiz>> {
        self.select(
            &format!("SELECT {QUIZ_COLUMNS} FROM quiz_quizzes"),
            &[],
            quiz_from_row,
        )
    }

    async fn get_all_questions(&self) -> Result<Vec<Question>> {
        self.select(
            &format!("SELECT {QUESTION_COLUMNS} FROM quiz_questions"),
            &[],
            question_from_row,
        )
    }

    async fn get_all_answers(&self) -> Result<Vec<Answer>> {
        self.select(
            &format!("SELECT {ANSWER_COLUMNS} FROM quiz_answer"),
            &[],
            answer_from_row,
        )
    }

    async fn get_categories_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>> {
        self.select_by_ids("quiz_category", CATEGORY_COLUMNS, ids, category_from_row)
    }

    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>> {
        self.select_by_ids("quiz_quizzes", QUIZ_COLUMNS, ids, quiz_from_row)
    }

    async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>> {
        self.select_by_ids("quiz_questions", QUESTION_COLUMNS, ids, question_from_row)
    }
}

// Inserts with a supplied id update the existing row instead, leaving
// date_created as first written.
#[async_trait]
impl AdminStorage for SqliteStorage {
    async fn create_book(&self, book: &mut Book) -> Result<()> {
        book.validate()?;
        let id: i64 = self.conn()?.query_row(
            "INSERT INTO books_books (id, title, author) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, author = excluded.author
             RETURNING id",
            params![book.id, book.title, book.author],
            |row| row.get(0),
        )?;
        book.id = Some(id);

        debug!("Created book: {} with id {}", book, id);
        Ok(())
    }

    async fn create_category(&self, category: &mut Category) -> Result<()> {
        category.validate()?;
        let id: i64 = self.conn()?.query_row(
            "INSERT INTO quiz_category (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name
             RETURNING id",
            params![category.id, category.name],
            |row| row.get(0),
        )?;
        category.id = Some(id);

        debug!("Created category: {} with id {}", category, id);
        Ok(())
    }

    async fn create_quiz(&self, quiz: &mut Quiz) -> Result<()> {
        quiz.validate()?;
        let conn = self.conn()?;
        require_parent(&conn, "quiz_category", "Category", quiz.category_id)?;
        let (id, date_created) = conn.query_row(
            "INSERT INTO quiz_quizzes (id, title, category_id, date_created) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, category_id = excluded.category_id
             RETURNING id, date_created",
            params![
                quiz.id,
                quiz.title,
                quiz.category_id,
                quiz.date_created.to_rfc3339()
            ],
            |row| Ok((row.get::<_, i64>(0)?, timestamp_at(row, 1)?)),
        )?;
        quiz.id = Some(id);
        quiz.date_created = date_created;

        debug!("Created quiz: {} with id {}", quiz, id);
        Ok(())
    }

    async fn create_question(&self, question: &mut Question) -> Result<()> {
        question.validate()?;
        let conn = self.conn()?;
        require_parent(&conn, "quiz_quizzes", "Quiz", question.quiz_id)?;
        let (id, date_created) = conn.query_row(
            "INSERT INTO quiz_questions (id, quiz_id, technique, title, difficulty, date_created, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET quiz_id = excluded.quiz_id, technique = excluded.technique,
                 title = excluded.title, difficulty = excluded.difficulty, is_active = excluded.is_active
             RETURNING id, date_created",
            params![
                question.id,
                question.quiz_id,
                question.technique.code(),
                question.title,
                question.difficulty.code(),
                question.date_created.to_rfc3339(),
                question.is_active
            ],
            |row| Ok((row.get::<_, i64>(0)?, timestamp_at(row, 1)?)),
        )?;
        question.id = Some(id);
        question.date_created = date_created;

        debug!(
            "Created question: {} ({}, {}) with id {}",
            question, question.technique, question.difficulty, id
        );
        Ok(())
    }

    async fn create_answer(&self, answer: &mut Answer) -> Result<()> {
        answer.validate()?;
        let conn = self.conn()?;
        require_parent(&conn, "quiz_questions", "Question", answer.question_id)?;
        let id: i64 = conn.query_row(
            "INSERT INTO quiz_answer (id, question_id, answer_text, is_right) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET question_id = excluded.question_id,
                 answer_text = excluded.answer_text, is_right = excluded.is_right
             RETURNING id",
            params![answer.id, answer.question_id, answer.answer_text, answer.is_right],
            |row| row.get(0),
        )?;
        answer.id = Some(id);

        debug!("Created answer: {} with id {}", answer, id);
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> Result<bool> {
        self.delete_row("books_books", id)
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        self.delete_row("quiz_category", id)
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool> {
        self.delete_row("quiz_quizzes", id)
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        self.delete_row("quiz_questions", id)
    }

    async fn delete_answer(&self, id: i64) -> Result<bool> {
        self.delete_row("quiz_answer", id)
    }

    async fn begin_batch(&self) -> Result<()> {
        self.conn()?.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    async fn commit_batch(&self) -> Result<()> {
        self.conn()?.execute_batch("COMMIT;")?;
        Ok(())
    }

    async fn rollback_batch(&self) -> Result<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK;")?;
            debug!("Rolled back batch");
        }
        Ok(())
    }
}
