//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► ApiError (apps/api)
//!
//! NotFound         404 "<Entity> not found"
//! UniqueViolation  400 "User already exists", "You already have a shop", ...
//! Conflict         400 with the message as written
//! everything else  500 "Server error" (details only in the log)
//! ```
//!
//! The unique indexes live in `001_initial_schema.sql`; SQLite reports a
//! hit on one as `UNIQUE constraint failed: index '<name>'`, and the index
//! name is what the API uses to pick a message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No document with this id, or a single-statement update matched
    /// nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// One of the unique expression indexes rejected a write: email,
    /// shop owner, employment or invoice number.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// The write is well-formed but the stored document refuses it.
    #[error("{0}")]
    Conflict(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored document no longer matches its Rust type, or a value
    /// could not be written as JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DbError::Conflict(message.into())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                match msg.split_once("UNIQUE constraint failed: ") {
                    Some((_, index)) => DbError::duplicate(index, "unknown"),
                    None => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Timed out waiting for a pooled connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pawmart_core::types::{Role, User};

    #[test]
    fn test_error_messages() {
        let err = DbError::not_found("Pet", "abc");
        assert_eq!(err.to_string(), "Pet not found: abc");

        let err = DbError::duplicate("email", "ana@example.com");
        assert_eq!(
            err.to_string(),
            "Duplicate email: 'ana@example.com' already exists"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<i64>("\"x\"").unwrap_err();
        let err: DbError = serde_err.into();
        assert!(matches!(err, DbError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unique_index_hit_names_the_index() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        let second = User::new("Ana", "ana@example.com", "h".to_string(), Role::Buyer);
        db.users().create(&first).await.unwrap();

        // Bypass the repository so the raw sqlx error is converted here.
        let err = crate::document::insert(db.pool(), &second).await.unwrap_err();
        assert!(
            matches!(err, DbError::UniqueViolation { ref field, .. } if field.contains("users_email_unique"))
        );
    }
}
