//! Customer Resolver
//!
//! A customer is identified by the exact (name, phone, street, neighborhood)
//! tuple. Values are stored as submitted: "Ana" and "ana" are two customers.

use shared::models::CustomerIdentity;
use sqlx::SqlitePool;

use super::store_error;
use crate::db::repository::customer;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};

pub(crate) fn validate_identity(identity: &CustomerIdentity) -> AppResult<()> {
    validate_required_text(&identity.name, "customerName", MAX_NAME_LEN)?;
    validate_required_text(&identity.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&identity.street, "street", MAX_ADDRESS_LEN)?;
    validate_required_text(&identity.neighborhood, "neighborhood", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// Find the customer with this exact identity or create one; returns its id
///
/// Two concurrent first orders for the same identity may both insert.
pub async fn resolve_customer(pool: &SqlitePool, identity: &CustomerIdentity) -> AppResult<i64> {
    validate_identity(identity)?;

    if let Some(existing) = customer::find_by_identity(pool, identity)
        .await
        .map_err(store_error)?
    {
        return Ok(existing.id);
    }

    let id = customer::insert(pool, identity).await.map_err(store_error)?;
    tracing::debug!(customer_id = id, "Customer created");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::error::ErrorCode;

    fn ana() -> CustomerIdentity {
        CustomerIdentity::new("Ana", "11 99999-0000", "Rua A, 10", "Centro")
    }

    async fn customer_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM customer")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let pool = test_pool().await;
        let first = resolve_customer(&pool, &ana()).await.unwrap();
        let second = resolve_customer(&pool, &ana()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(customer_count(&pool).await, 1);

        let stored = customer::find_by_id(&pool, first).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ana");
        assert_eq!(stored.neighborhood, "Centro");
    }

    #[tokio::test]
    async fn test_case_difference_creates_new_customer() {
        let pool = test_pool().await;
        let first = resolve_customer(&pool, &ana()).await.unwrap();

        let mut lower = ana();
        lower.name = "ana".to_string();
        let second = resolve_customer(&pool, &lower).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(customer_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_values_stored_unmodified() {
        let pool = test_pool().await;
        let padded = CustomerIdentity::new(" Ana ", "11 99999-0000", "Rua A, 10", "Centro");
        let id = resolve_customer(&pool, &padded).await.unwrap();

        let stored = customer::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(stored.name, " Ana ");
        assert_ne!(id, resolve_customer(&pool, &ana()).await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_field_rejected() {
        let pool = test_pool().await;
        let mut identity = ana();
        identity.phone = "   ".to_string();

        let err = resolve_customer(&pool, &identity).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(customer_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_store_unavailable() {
        let pool = test_pool().await;
        pool.close().await;

        let err = resolve_customer(&pool, &ana()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }
}
