//! Shared types for the menu server
//!
//! Common types used by the server crate and its HTTP clients: domain
//! models, cart / order DTOs, error types and response structures.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{CartAddOn, CartLine, FinalizeOrderRequest, FinalizedOrder, OrderEvent};
