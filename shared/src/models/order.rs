//! Order Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment method label (no payment processing)
///
/// Stored as its integer code. Parses the canonical names case-insensitively
/// plus the legacy storefront labels `Dinheiro` and `Cartão` / `Cartao`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[repr(i32)]
pub enum PaymentMethod {
    Cash = 1,
    Pix = 2,
    Card = 3,
}

impl PaymentMethod {
    /// Integer code persisted in `orders.payment_method`
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Pix => "Pix",
            Self::Card => "Card",
        }
    }
}

/// Unknown payment method label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPaymentMethod(pub String);

impl fmt::Display for InvalidPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid payment method: {}", self.0)
    }
}

impl std::error::Error for InvalidPaymentMethod {}

impl FromStr for PaymentMethod {
    type Err = InvalidPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(Self::Cash),
            "pix" => Ok(Self::Pix),
            "card" | "cartão" | "cartao" => Ok(Self::Card),
            _ => Err(InvalidPaymentMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = InvalidPaymentMethod;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[repr(i32)]
pub enum OrderStatus {
    /// Visible on the dashboard
    Placed = 1,
    /// Hidden from the default dashboard listing, still counted in rollups
    Archived = 2,
}

/// Add-on attached to an order line (price snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineAddOn {
    pub id: i64,
    pub order_line_id: i64,
    /// NULL once the product is deleted from the catalog
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// Order line as returned by the order query
///
/// `unit_price` is the snapshot taken when the order was placed (add-ons
/// included per unit); `current_unit_price` is the same figure at today's
/// catalog prices, `None` when the base product no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: f64,
    pub current_unit_price: Option<f64>,
    pub quantity: i64,
    pub note: Option<String>,
    /// `unit_price × quantity`, rounded to 2 decimals
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub line_total: f64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub add_ons: Vec<OrderLineAddOn>,
}

/// Order with customer fields and nested lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderDetail {
    pub id: i64,
    pub created_at: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub customer_id: i64,
    pub customer_name: String,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub lines: Vec<OrderLineDetail>,
}
