//! Order Query
//!
//! Dashboard reads plus the two admin mutations (archive, delete).

use std::collections::HashMap;

use shared::models::{OrderDetail, OrderLineAddOn, OrderStatus};
use shared::order::OrderEvent;
use sqlx::SqlitePool;

use super::{OrderFeed, store_error};
use crate::db::repository::order::{self, LineScope};
use crate::pricing::money;
use crate::utils::{AppError, AppResult, ErrorCode};

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

/// Attach lines (with `line_total`) and their add-ons
async fn load_lines(pool: &SqlitePool, scope: LineScope, orders: &mut [OrderDetail]) -> AppResult<()> {
    let lines = order::find_lines(pool, scope).await.map_err(store_error)?;

    let mut add_ons_by_line: HashMap<i64, Vec<OrderLineAddOn>> = HashMap::new();
    for add_on in order::find_add_ons(pool, scope).await.map_err(store_error)? {
        add_ons_by_line.entry(add_on.order_line_id).or_default().push(add_on);
    }

    // 订单在两次查询之间被新增时，其行在这里被丢弃
    let mut lines_by_order: HashMap<i64, Vec<_>> = HashMap::new();
    for mut line in lines {
        line.line_total = money::line_total(line.unit_price, line.quantity);
        line.add_ons = add_ons_by_line.remove(&line.id).unwrap_or_default();
        lines_by_order.entry(line.order_id).or_default().push(line);
    }

    for o in orders.iter_mut() {
        o.lines = lines_by_order.remove(&o.id).unwrap_or_default();
    }
    Ok(())
}

/// Newest first; archived orders only when `include_archived`
pub async fn list_orders(pool: &SqlitePool, include_archived: bool) -> AppResult<Vec<OrderDetail>> {
    let mut orders = order::find_all(pool, include_archived)
        .await
        .map_err(store_error)?;
    load_lines(pool, LineScope::Listing { include_archived }, &mut orders).await?;
    Ok(orders)
}

pub async fn get_order(pool: &SqlitePool, id: i64) -> AppResult<OrderDetail> {
    let found = order::find_by_id(pool, id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| order_not_found(id))?;
    let mut orders = [found];
    load_lines(pool, LineScope::Order(id), &mut orders).await?;
    let [detail] = orders;
    Ok(detail)
}

/// Hide from the default listing; archiving twice is a no-op
pub async fn archive_order(pool: &SqlitePool, feed: &OrderFeed, id: i64) -> AppResult<OrderDetail> {
    order::set_status(pool, id, OrderStatus::Archived)
        .await
        .map_err(store_error)?;
    feed.publish(OrderEvent::Archived { order_id: id });
    tracing::info!(order_id = id, "Order archived");
    get_order(pool, id).await
}

/// Hard delete, lines and add-ons included; excluded from rollups afterwards
pub async fn delete_order(pool: &SqlitePool, feed: &OrderFeed, id: i64) -> AppResult<bool> {
    order::delete(pool, id).await.map_err(store_error)?;
    feed.publish(OrderEvent::Deleted { order_id: id });
    tracing::info!(order_id = id, "Order deleted");
    Ok(true)
}
