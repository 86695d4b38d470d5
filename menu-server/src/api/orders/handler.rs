//! Orders API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use shared::models::OrderDetail;
use shared::order::{FinalizeOrderRequest, FinalizedOrder};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;
use crate::orders;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// POST /api/orders - 下单
///
/// 客户端提交的金额一律忽略，总价由服务端按目录计算
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FinalizeOrderRequest>,
) -> AppResult<Json<ApiResponse<FinalizedOrder>>> {
    let placed = state.finalizer().finalize(payload).await?;
    Ok(ok(placed))
}

/// GET /api/orders - 订单列表 (新→旧)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    let orders = orders::list_orders(&state.pool, query.include_archived).await?;
    Ok(ok(orders))
}

/// GET /api/orders/:id - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let order = orders::get_order(&state.pool, id).await?;
    Ok(ok(order))
}

/// POST /api/orders/:id/archive - 归档 (幂等)
pub async fn archive(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let order = orders::archive_order(&state.pool, &state.feed, id).await?;
    Ok(ok(order))
}

/// DELETE /api/orders/:id - 删除订单
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let result = orders::delete_order(&state.pool, &state.feed, id).await?;
    Ok(ok(result))
}

/// GET /api/orders/stream - 订单事件推送 (SSE)
///
/// event 名 = 事件类型，data = JSON。落后的订阅者跳过丢失的事件继续接收。
pub async fn stream(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.feed.subscribe();
    tracing::debug!(subscribers = state.feed.subscriber_count(), "Order stream opened");

    let events = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse) => return Some((Ok(sse), rx)),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode order event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Order stream lagged, skipping missed events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
