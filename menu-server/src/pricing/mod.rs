//! Order pricing
//!
//! Recomputes authoritative line prices from the catalog. Client-submitted
//! prices never exist on the wire; only product ids and quantities do.
//!
//! - [`CatalogLookup`]: read seam over the product catalog
//! - [`price_order`]: cart lines → [`PricedOrder`]
//! - [`money`]: `Decimal` helpers (round half-up to 2 dp)

mod engine;
pub mod money;

pub use engine::{PricedAddOn, PricedLine, PricedOrder, price_order, validate_cart};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::repository::product;
use crate::utils::{AppError, AppResult};

/// What to do with a cart line (or add-on) whose product is not in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedLinePolicy {
    /// Drop the line, log a warning and price the rest
    #[default]
    Skip,
    /// Fail the whole order with `ProductNotFound`
    Reject,
}

impl FromStr for UnresolvedLinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown unresolved line policy: {other}")),
        }
    }
}

impl fmt::Display for UnresolvedLinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Catalog data needed to price a line
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Read access to the product catalog
///
/// Implementations return only the ids that exist. A failure to read the
/// catalog at all must surface as `CatalogUnavailable`.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup(&self, ids: &[i64]) -> AppResult<HashMap<i64, CatalogEntry>>;
}

/// Catalog backed by the `product` table
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogLookup for SqliteCatalog {
    async fn lookup(&self, ids: &[i64]) -> AppResult<HashMap<i64, CatalogEntry>> {
        let products = product::find_by_ids(&self.pool, ids).await.map_err(|e| {
            tracing::error!(error = %e, "Catalog read failed");
            AppError::catalog_unavailable(format!("Catalog read failed: {e}"))
        })?;

        Ok(products
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    CatalogEntry {
                        id: p.id,
                        name: p.name,
                        price: p.price,
                    },
                )
            })
            .collect())
    }
}
