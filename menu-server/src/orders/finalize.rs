//! Order Finalization
//!
//! Turns a submitted cart into a persisted, priced order. Everything the
//! client sends about money is ignored; totals come from the catalog.

use std::sync::Arc;

use shared::error::ErrorCode;
use shared::models::PaymentMethod;
use shared::order::{FinalizeOrderRequest, FinalizedOrder, OrderEvent};
use sqlx::SqlitePool;

use super::customer::{resolve_customer, validate_identity};
use super::{OrderFeed, store_error};
use crate::db::repository::order::{self, NewOrder, NewOrderLine, NewOrderLineAddOn};
use crate::pricing::money::{decimal_to_f64, to_f64};
use crate::pricing::{CatalogLookup, PricedOrder, UnresolvedLinePolicy, price_order, validate_cart};
use crate::utils::{AppError, AppResult};

/// Order finalization orchestrator
///
/// Holds shared handles only; build one per request via
/// [`ServerState::finalizer`](crate::core::ServerState::finalizer).
pub struct OrderFinalizer {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogLookup>,
    policy: UnresolvedLinePolicy,
    feed: OrderFeed,
}

impl OrderFinalizer {
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogLookup>,
        policy: UnresolvedLinePolicy,
        feed: OrderFeed,
    ) -> Self {
        Self {
            pool,
            catalog,
            policy,
            feed,
        }
    }

    /// Validate, resolve customer, price, persist atomically, publish
    ///
    /// Nothing order-side is written unless pricing succeeds with at least
    /// one line. A failed write leaves no order rows behind.
    pub async fn finalize(&self, request: FinalizeOrderRequest) -> AppResult<FinalizedOrder> {
        // 1. Validate
        let payment_method = parse_payment_method(&request.payment_method)?;
        let identity = request.identity();
        validate_identity(&identity)?;
        validate_cart(&request.lines)?;

        // 2. Customer
        let customer_id = resolve_customer(&self.pool, &identity).await?;

        // 3. Price
        let priced = price_order(self.catalog.as_ref(), self.policy, &request.lines).await?;
        if priced.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::OrderEmpty,
                "None of the ordered products exist in the catalog",
            )
            .with_detail("skipped", priced.skipped));
        }

        // 4. Persist
        let new_order = to_new_order(&priced, payment_method, customer_id);
        let order_id = self.persist(&new_order).await?;

        // 5. Publish
        let total_amount = to_f64(priced.total_amount);
        self.feed.publish(OrderEvent::Placed {
            order_id,
            total_amount,
        });

        tracing::info!(
            order_id,
            customer_id,
            total_amount,
            lines = priced.lines.len(),
            skipped = priced.skipped.len(),
            payment_method = %payment_method,
            "Order placed"
        );

        Ok(FinalizedOrder {
            order_id,
            total_amount,
        })
    }

    /// Header, lines and add-ons in one transaction
    async fn persist(&self, new_order: &NewOrder) -> AppResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error(e.into()))?;

        match order::insert_order(&mut tx, new_order).await {
            Ok(order_id) => {
                tx.commit().await.map_err(|e| store_error(e.into()))?;
                Ok(order_id)
            }
            Err(write_err) => match tx.rollback().await {
                Ok(()) => {
                    tracing::error!(error = %write_err, "Order write failed, rolled back");
                    Err(AppError::store_unavailable(write_err.to_string()))
                }
                Err(rollback_err) => {
                    tracing::error!(
                        error = %write_err,
                        rollback_error = %rollback_err,
                        "Order write failed and rollback failed"
                    );
                    Err(AppError::partial_persistence(format!(
                        "{write_err}; rollback failed: {rollback_err}"
                    )))
                }
            },
        }
    }
}

fn parse_payment_method(label: &str) -> AppResult<PaymentMethod> {
    label.parse().map_err(|_| {
        AppError::with_message(
            ErrorCode::PaymentInvalidMethod,
            format!("Unknown payment method: {label}"),
        )
        .with_detail("payment_method", label)
    })
}

fn to_new_order(priced: &PricedOrder, payment_method: PaymentMethod, customer_id: i64) -> NewOrder {
    NewOrder {
        created_at: shared::util::now_millis(),
        payment_method,
        customer_id,
        total_amount: to_f64(priced.total_amount),
        lines: priced
            .lines
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                unit_price: decimal_to_f64(line.unit_price),
                quantity: line.quantity,
                note: line.note.clone(),
                add_ons: line
                    .add_ons
                    .iter()
                    .map(|a| NewOrderLineAddOn {
                        product_id: a.product_id,
                        product_name: a.product_name.clone(),
                        unit_price: decimal_to_f64(a.unit_price),
                        quantity: a.quantity,
                    })
                    .collect(),
            })
            .collect(),
    }
}
