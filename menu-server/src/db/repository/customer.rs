//! Customer Repository

use super::RepoResult;
use shared::models::{Customer, CustomerIdentity};
use sqlx::SqlitePool;

/// Exact match on all four identity fields (case-sensitive, unnormalized)
pub async fn find_by_identity(
    pool: &SqlitePool,
    identity: &CustomerIdentity,
) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, street, neighborhood FROM customer WHERE name = ?1 AND phone = ?2 AND street = ?3 AND neighborhood = ?4 ORDER BY id LIMIT 1",
    )
    .bind(&identity.name)
    .bind(&identity.phone)
    .bind(&identity.street)
    .bind(&identity.neighborhood)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, street, neighborhood FROM customer WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn insert(pool: &SqlitePool, identity: &CustomerIdentity) -> RepoResult<i64> {
    let id = sqlx::query_scalar(
        "INSERT INTO customer (name, phone, street, neighborhood) VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(&identity.name)
    .bind(&identity.phone)
    .bind(&identity.street)
    .bind(&identity.neighborhood)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
