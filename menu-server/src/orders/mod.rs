//! 订单模块
//!
//! - **finalize**: 购物车 → 定价 → 单事务落库 → 广播
//! - **customer**: 顾客查找或创建 (四字段精确匹配)
//! - **query**: 订单列表 / 详情 / 归档 / 删除
//! - **rollup**: 日 / 周 / 月营收汇总
//! - **feed**: 进程内订单事件广播 (SSE 数据源)
//!
//! ```text
//! FinalizeOrderRequest → validate → resolve_customer → price_order
//!                                                         ↓
//!                         OrderFeed ← commit ← insert_order (tx)
//! ```

pub mod customer;
pub mod feed;
pub mod finalize;
pub mod query;
pub mod rollup;

pub use customer::resolve_customer;
pub use feed::OrderFeed;
pub use finalize::OrderFinalizer;
pub use query::{archive_order, delete_order, get_order, list_orders};
pub use rollup::rollup;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Map repository failures on the order side
///
/// Business errors (e.g. `OrderNotFound`) keep their code; anything the store
/// itself failed on becomes `StoreUnavailable`.
pub(crate) fn store_error(err: RepoError) -> AppError {
    match err {
        RepoError::Business(..) | RepoError::Validation(_) => err.into(),
        other => {
            tracing::error!(error = %other, "Order store failure");
            AppError::store_unavailable(other.to_string())
        }
    }
}
