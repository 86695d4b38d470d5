//! Financials API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::models::{FinancialSummary, RollupQuery};

use crate::core::ServerState;
use crate::orders;
use crate::utils::time::today;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/financials?day=YYYY-MM-DD&week=YYYY-Www&month=YYYY-MM
///
/// 缺省参数按业务时区的"今天"取值
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<RollupQuery>,
) -> AppResult<Json<ApiResponse<FinancialSummary>>> {
    let tz = state.config.timezone;
    let summary = orders::rollup(&state.pool, tz, &query, today(tz)).await?;
    Ok(ok(summary))
}
