//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`catalog`] - 商品 / 分类管理接口
//! - [`orders`] - 下单、订单看板、SSE 推送
//! - [`financials`] - 营业额汇总

pub mod catalog;
pub mod financials;
pub mod health;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
