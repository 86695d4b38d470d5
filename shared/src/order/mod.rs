//! Order placement module
//!
//! This module provides the types exchanged around order placement:
//! - Cart: Client-held, unpriced selections submitted for finalization
//! - Events: Change notifications published on the order feed

pub mod cart;
pub mod event;

// Re-exports
pub use cart::{CartAddOn, CartLine, FinalizeOrderRequest, FinalizedOrder};
pub use event::OrderEvent;
