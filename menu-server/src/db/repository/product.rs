//! Product Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.description, p.price, p.category_id, c.name AS category_name FROM product p JOIN category c ON c.id = p.category_id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY p.id"))
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

/// Batch lookup used by order pricing; ids absent from the catalog are simply missing
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_PRODUCT);
    qb.push(" WHERE p.id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
    Ok(products)
}

async fn ensure_category(pool: &SqlitePool, category_id: i64) -> RepoResult<()> {
    if super::category::find_by_id(pool, category_id).await?.is_none() {
        return Err(RepoError::Business(
            ErrorCode::CategoryNotFound,
            format!("Category {category_id} not found"),
        ));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    ensure_category(pool, data.category_id).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, description, price, category_id) VALUES (?1, ?2, ?3, ?4) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.description.as_deref().unwrap_or(""))
    .bind(data.price)
    .bind(data.category_id)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Partial update; omitted fields keep their value
pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if let Some(category_id) = data.category_id {
        ensure_category(pool, category_id).await?;
    }

    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category_id = COALESCE(?4, category_id) WHERE id = ?5",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }
    find_by_id(pool, id).await?.ok_or_else(|| {
        RepoError::Business(ErrorCode::ProductNotFound, format!("Product {id} not found"))
    })
}

/// Hard delete; historical order lines keep their name / price snapshot
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_category, test_pool};

    fn hotdog(category_id: i64) -> ProductCreate {
        ProductCreate {
            name: "Hotdog".into(),
            description: Some("Pão, salsicha e molho".into()),
            price: 12.5,
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_joins_category_name() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "Lanches").await;

        let product = create(&pool, hotdog(cat)).await.unwrap();
        assert_eq!(product.name, "Hotdog");
        assert_eq!(product.price, 12.5);
        assert_eq!(product.category_name, "Lanches");

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all, vec![product]);
    }

    #[tokio::test]
    async fn test_create_requires_category() {
        let pool = test_pool().await;
        let err = create(&pool, hotdog(42)).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::CategoryNotFound, _)
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "Lanches").await;
        let product = create(&pool, hotdog(cat)).await.unwrap();

        let updated = update(
            &pool,
            product.id,
            ProductUpdate {
                price: Some(14.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 14.0);
        assert_eq!(updated.name, "Hotdog");
        assert_eq!(updated.description, "Pão, salsicha e molho");

        let err = update(&pool, 999, ProductUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ProductNotFound, _)));
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_missing() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "Lanches").await;
        let product = create(&pool, hotdog(cat)).await.unwrap();

        let found = find_by_ids(&pool, &[product.id, 999]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, product.id);
        assert!(find_by_ids(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let cat = seed_category(&pool, "Lanches").await;
        let product = create(&pool, hotdog(cat)).await.unwrap();

        assert!(delete(&pool, product.id).await.unwrap());
        assert!(find_by_id(&pool, product.id).await.unwrap().is_none());

        let err = delete(&pool, product.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ProductNotFound, _)));
    }
}
