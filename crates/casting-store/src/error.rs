//! Storage errors.

use casting_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with this id.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The requested change is not a valid movie or actor.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A foreign key, unique or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn movie_not_found(id: i64) -> Self {
        Self::NotFound { entity: "movie", id }
    }

    pub fn actor_not_found(id: i64) -> Self {
        Self::NotFound { entity: "actor", id }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.kind() {
                sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    return StoreError::Constraint(db.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
