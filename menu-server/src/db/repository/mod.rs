//! Repository Module
//!
//! Free async functions over `&SqlitePool` (or an open transaction), one file per table group.

// Catalog
pub mod category;
pub mod product;

// Customers
pub mod customer;

// Orders
pub mod order;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation carrying a specific error code
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;

    use crate::db::DbService;

    /// Migrated in-memory pool
    pub async fn test_pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    /// Insert a category and return its id
    pub async fn seed_category(pool: &SqlitePool, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO category (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// Insert a product and return its id
    pub async fn seed_product(pool: &SqlitePool, category_id: i64, name: &str, price: f64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO product (name, description, price, category_id) VALUES (?, '', ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(category_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }
}
