use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {entity}.{field}: {message}")]
    Validation {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("{entity} with id {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("Invalid choice for {field}: {value:?}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, ApiError>;
