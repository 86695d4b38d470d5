//! Data models
//!
//! Shared between menu-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod customer;
pub mod financial;
pub mod order;
pub mod product;

// Re-exports
pub use category::*;
pub use customer::*;
pub use financial::*;
pub use order::*;
pub use product::*;
