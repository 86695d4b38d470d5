//! Category Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Category, CategoryCreate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Category>> {
    let category =
        sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Business(
            ErrorCode::CategoryNameExists,
            format!("Category '{}' already exists", data.name),
        ));
    }

    let id: i64 = sqlx::query_scalar("INSERT INTO category (name) VALUES (?) RETURNING id")
        .bind(&data.name)
        .fetch_one(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            // 并发插入同名分类: UNIQUE 约束兜底
            RepoError::Duplicate(_) => RepoError::Business(
                ErrorCode::CategoryNameExists,
                format!("Category '{}' already exists", data.name),
            ),
            other => other,
        })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

/// Hard delete a category; rejected while products still reference it
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::Business(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        ));
    }

    let product_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if product_count > 0 {
        return Err(RepoError::Business(
            ErrorCode::CategoryHasProducts,
            format!("Category {id} still has {product_count} product(s)"),
        ));
    }

    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
