//! Cart types submitted by the storefront

use crate::models::CustomerIdentity;
use serde::{Deserialize, Serialize};

/// Add-on selected for a cart line (e.g. extra cheese)
///
/// `quantity` is per unit of the parent line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddOn {
    pub product_id: i64,
    pub quantity: i64,
}

/// One cart selection
///
/// Quantities are signed so that zero or negative values reach validation
/// and are rejected with a domain error instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_ons: Vec<CartAddOn>,
}

impl CartLine {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
            note: None,
            add_ons: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_add_on(mut self, product_id: i64, quantity: i64) -> Self {
        self.add_ons.push(CartAddOn {
            product_id,
            quantity,
        });
        self
    }
}

/// Order finalization request (POST /api/orders)
///
/// Wire names are camelCase. `payment_method` stays a raw label here; it is parsed during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOrderRequest {
    pub customer_name: String,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,
    pub payment_method: String,
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl FinalizeOrderRequest {
    /// Customer natural key, values unmodified
    pub fn identity(&self) -> CustomerIdentity {
        CustomerIdentity::new(
            self.customer_name.clone(),
            self.phone.clone(),
            self.street.clone(),
            self.neighborhood.clone(),
        )
    }
}

/// Result of a successful finalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedOrder {
    pub order_id: i64,
    pub total_amount: f64,
}
