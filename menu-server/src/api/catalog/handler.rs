//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Category, CategoryCreate, Product, ProductCreate, ProductUpdate};
use shared::order::OrderEvent;

use crate::core::ServerState;
use crate::db::repository::{category, product};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const PRODUCT: &str = "product";
const CATEGORY: &str = "category";

fn catalog_changed(state: &ServerState, resource: &str) {
    state.feed.publish(OrderEvent::CatalogChanged {
        resource: resource.to_string(),
    });
}

fn validate_product_create(payload: &ProductCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_price(payload.price)?;
    Ok(())
}

fn validate_product_update(payload: &ProductUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    Ok(())
}

// ========== Products ==========

/// GET /api/catalog/products - 获取所有商品 (含分类名)
pub async fn list_products(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = product::find_all(&state.pool).await?;
    Ok(ok(products))
}

/// GET /api/catalog/products/:id - 获取单个商品
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let p = product::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
    })?;
    Ok(ok(p))
}

/// POST /api/catalog/products - 创建商品
pub async fn create_product(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_product_create(&payload)?;
    let p = product::create(&state.pool, payload).await?;

    tracing::info!(product_id = p.id, name = %p.name, price = p.price, "Product created");
    catalog_changed(&state, PRODUCT);
    Ok(ok(p))
}

/// PUT /api/catalog/products/:id - 更新商品 (部分字段)
pub async fn update_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_product_update(&payload)?;
    let p = product::update(&state.pool, id, payload).await?;

    tracing::info!(product_id = id, "Product updated");
    catalog_changed(&state, PRODUCT);
    Ok(ok(p))
}

/// DELETE /api/catalog/products/:id - 删除商品
///
/// 历史订单行保留名称和价格快照
pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let result = product::delete(&state.pool, id).await?;

    tracing::info!(product_id = id, "Product deleted");
    catalog_changed(&state, PRODUCT);
    Ok(ok(result))
}

// ========== Categories ==========

/// GET /api/catalog/categories - 获取所有分类
pub async fn list_categories(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(ok(categories))
}

/// POST /api/catalog/categories - 创建分类
pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let c = category::create(&state.pool, payload).await?;

    tracing::info!(category_id = c.id, name = %c.name, "Category created");
    catalog_changed(&state, CATEGORY);
    Ok(ok(c))
}

/// DELETE /api/catalog/categories/:id - 删除分类 (仍有商品时拒绝)
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let result = category::delete(&state.pool, id).await?;

    tracing::info!(category_id = id, "Category deleted");
    catalog_changed(&state, CATEGORY);
    Ok(ok(result))
}
