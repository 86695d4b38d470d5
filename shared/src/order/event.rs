//! Order feed events

use serde::{Deserialize, Serialize};

/// Change notification published after a successful write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: i64, total_amount: f64 },
    Archived { order_id: i64 },
    Deleted { order_id: i64 },
    /// Product or category added, changed or removed
    CatalogChanged { resource: String },
}

impl OrderEvent {
    /// Event name (SSE `event:` field)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::Archived { .. } => "archived",
            Self::Deleted { .. } => "deleted",
            Self::CatalogChanged { .. } => "catalog_changed",
        }
    }
}
