//! Orders API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 下单 (服务端定价) |
//! | /api/orders | GET | 订单看板 (`?include_archived=true`) |
//! | /api/orders/stream | GET | 订单事件 SSE |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id} | DELETE | 删除订单 |
//! | /api/orders/{id}/archive | POST | 归档订单 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/stream", get(handler::stream))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/archive", post(handler::archive))
}
