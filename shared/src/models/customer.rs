//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity
///
/// Created on the first order placed with a given identity and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,
}

/// Natural key of a customer
///
/// Matching is exact on all four fields: no trimming, no case folding,
/// no phone normalization. `"Ana"` and `"ana"` are different customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub neighborhood: String,
}

impl CustomerIdentity {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        street: impl Into<String>,
        neighborhood: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            street: street.into(),
            neighborhood: neighborhood.into(),
        }
    }
}
