//! Revenue rollup models (营业额汇总)

use serde::{Deserialize, Serialize};

/// Optional window selectors for a rollup request
///
/// - `day`: `YYYY-MM-DD`
/// - `week`: `YYYY-Www` (`W` case-insensitive, week 1..=53)
/// - `month`: `YYYY-MM`
///
/// Any omitted selector defaults to the window containing today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollupQuery {
    pub day: Option<String>,
    pub week: Option<String>,
    pub month: Option<String>,
}

/// Count and revenue for one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupWindow {
    pub count: i64,
    pub revenue: f64,
}

/// Daily / weekly / monthly rollup
///
/// Resolved window bounds are echoed back as `YYYY-MM-DD` (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub daily_count: i64,
    pub daily_revenue: f64,
    pub weekly_count: i64,
    pub weekly_revenue: f64,
    pub monthly_count: i64,
    pub monthly_revenue: f64,
    pub day: String,
    pub week_start: String,
    pub week_end: String,
    pub month_start: String,
    pub month_end: String,
}
