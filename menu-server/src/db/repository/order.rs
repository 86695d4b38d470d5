//! Order Repository
//!
//! Header / line / add-on writes happen inside a caller-owned transaction so an
//! order is either fully written or not at all.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{OrderDetail, OrderLineAddOn, OrderLineDetail, OrderStatus, PaymentMethod};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Order header to insert
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub created_at: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: i64,
    pub total_amount: f64,
    pub lines: Vec<NewOrderLine>,
}

/// Order line to insert (price snapshot, add-ons included per unit)
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub note: Option<String>,
    pub add_ons: Vec<NewOrderLineAddOn>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLineAddOn {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// Insert header, lines and add-ons using the given transaction; returns the order id
///
/// The caller commits or rolls back.
pub async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &NewOrder) -> RepoResult<i64> {
    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (created_at, payment_method, status, customer_id, total_amount) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )
    .bind(order.created_at)
    .bind(order.payment_method)
    .bind(OrderStatus::Placed)
    .bind(order.customer_id)
    .bind(order.total_amount)
    .fetch_one(&mut **tx)
    .await?;

    for line in &order.lines {
        let line_id: i64 = sqlx::query_scalar(
            "INSERT INTO order_line (order_id, product_id, product_name, unit_price, quantity, note) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .bind(&line.note)
        .fetch_one(&mut **tx)
        .await?;

        for add_on in &line.add_ons {
            sqlx::query(
                "INSERT INTO order_line_addon (order_line_id, product_id, product_name, unit_price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(line_id)
            .bind(add_on.product_id)
            .bind(&add_on.product_name)
            .bind(add_on.unit_price)
            .bind(add_on.quantity)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(order_id)
}

const SELECT_ORDER: &str = "SELECT o.id, o.created_at, o.payment_method, o.status, o.total_amount, o.customer_id, c.name AS customer_name, c.phone, c.street, c.neighborhood FROM orders o JOIN customer c ON c.id = o.customer_id";

/// Newest first; archived orders only when `include_archived`
pub async fn find_all(pool: &SqlitePool, include_archived: bool) -> RepoResult<Vec<OrderDetail>> {
    let orders = sqlx::query_as::<_, OrderDetail>(&format!(
        "{SELECT_ORDER} WHERE (?1 OR o.status = ?2) ORDER BY o.created_at DESC, o.id DESC"
    ))
    .bind(include_archived)
    .bind(OrderStatus::Placed)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let order = sqlx::query_as::<_, OrderDetail>(&format!("{SELECT_ORDER} WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Which orders `find_lines` / `find_add_ons` load children for
///
/// Filtered by joining `orders`; the bound parameter count is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineScope {
    /// Same filter as `find_all`
    Listing { include_archived: bool },
    Order(i64),
}

impl LineScope {
    fn filter(self) -> &'static str {
        match self {
            Self::Listing { .. } => "(?1 OR o.status = ?2)",
            Self::Order(_) => "o.id = ?1",
        }
    }
}

/// Lines in scope, with today's catalog price for drift reporting
///
/// `current_unit_price` is the current base price plus current add-on prices,
/// NULL when the base product or any add-on product has been deleted.
/// `line_total` is left at zero.
pub async fn find_lines(pool: &SqlitePool, scope: LineScope) -> RepoResult<Vec<OrderLineDetail>> {
    let sql = format!(
        "SELECT l.id, l.order_id, l.product_id, l.product_name, l.unit_price, \
         CASE WHEN EXISTS (SELECT 1 FROM order_line_addon x WHERE x.order_line_id = l.id AND x.product_id IS NULL) THEN NULL \
         ELSE p.price + COALESCE((SELECT SUM(ap.price * a.quantity) FROM order_line_addon a JOIN product ap ON ap.id = a.product_id WHERE a.order_line_id = l.id), 0) \
         END AS current_unit_price, \
         l.quantity, l.note \
         FROM order_line l JOIN orders o ON o.id = l.order_id LEFT JOIN product p ON p.id = l.product_id \
         WHERE {} ORDER BY l.order_id, l.id",
        scope.filter()
    );
    let query = sqlx::query_as::<_, OrderLineDetail>(&sql);
    let query = match scope {
        LineScope::Listing { include_archived } => {
            query.bind(include_archived).bind(OrderStatus::Placed)
        }
        LineScope::Order(id) => query.bind(id),
    };
    let lines = query.fetch_all(pool).await?;
    Ok(lines)
}

pub async fn find_add_ons(pool: &SqlitePool, scope: LineScope) -> RepoResult<Vec<OrderLineAddOn>> {
    let sql = format!(
        "SELECT a.id, a.order_line_id, a.product_id, a.product_name, a.unit_price, a.quantity \
         FROM order_line_addon a JOIN order_line l ON l.id = a.order_line_id JOIN orders o ON o.id = l.order_id \
         WHERE {} ORDER BY a.order_line_id, a.id",
        scope.filter()
    );
    let query = sqlx::query_as::<_, OrderLineAddOn>(&sql);
    let query = match scope {
        LineScope::Listing { include_archived } => {
            query.bind(include_archived).bind(OrderStatus::Placed)
        }
        LineScope::Order(id) => query.bind(id),
    };
    let add_ons = query.fetch_all(pool).await?;
    Ok(add_ons)
}

/// Set order status; idempotent
pub async fn set_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::OrderNotFound,
            format!("Order {id} not found"),
        ));
    }
    Ok(())
}

/// Hard delete; lines and add-ons cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::OrderNotFound,
            format!("Order {id} not found"),
        ));
    }
    Ok(true)
}

/// Order count and summed `total_amount` for `created_at` in `[start, end)`
pub async fn sum_in_range(pool: &SqlitePool, start_millis: i64, end_millis: i64) -> RepoResult<(i64, f64)> {
    let row = sqlx::query_as::<_, (i64, f64)>(
        "SELECT COUNT(*), COALESCE(SUM(total_amount), 0.0) FROM orders WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
