//! Catalog API 模块 (商品 + 分类)

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/catalog", routes())
        // 旧版前端使用的删除路径
        .route("/api/products/{id}", delete(handler::delete_product))
}

fn routes() -> Router<ServerState> {
    let products = Router::new()
        .route("/products", get(handler::list_products).post(handler::create_product))
        .route(
            "/products/{id}",
            get(handler::get_product)
                .put(handler::update_product)
                .delete(handler::delete_product),
        );

    let categories = Router::new()
        .route("/categories", get(handler::list_categories).post(handler::create_category))
        .route("/categories/{id}", delete(handler::delete_category));

    products.merge(categories)
}
