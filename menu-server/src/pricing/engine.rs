//! Cart pricing engine
//!
//! ```text
//! unit_price = catalog_price + Σ(add_on_price × add_on_qty)
//! line_total = unit_price × quantity          (exact, not rounded)
//! total      = round_half_up(Σ line_total, 2) (rounded once)
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::order::CartLine;

use super::money::{round_money, to_decimal};
use super::{CatalogEntry, CatalogLookup, UnresolvedLinePolicy};
use crate::utils::validation::{
    MAX_ADD_ONS_PER_LINE, MAX_CART_LINES, MAX_NOTE_LEN, validate_optional_text, validate_quantity,
};
use crate::utils::{AppError, AppResult};

/// Add-on resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PricedAddOn {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    /// Per unit of the parent line
    pub quantity: i64,
}

/// Cart line resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    /// Catalog price of the base product
    pub base_price: Decimal,
    /// Base price plus add-ons, per unit
    pub unit_price: Decimal,
    pub quantity: i64,
    pub note: Option<String>,
    pub add_ons: Vec<PricedAddOn>,
    pub line_total: Decimal,
}

/// Authoritative pricing of a cart
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    /// Rounded half-up to 2 decimal places
    pub total_amount: Decimal,
    pub lines: Vec<PricedLine>,
    /// Product ids dropped under [`UnresolvedLinePolicy::Skip`] (lines and add-ons)
    pub skipped: Vec<i64>,
}

impl PricedOrder {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart shape checks, run before any catalog or store access
pub fn validate_cart(lines: &[CartLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::validation("Order must contain at least one line"));
    }
    if lines.len() > MAX_CART_LINES {
        return Err(AppError::validation(format!(
            "Order has too many lines ({}, max {MAX_CART_LINES})",
            lines.len()
        ))
        .with_detail("field", "lines"));
    }
    for (i, line) in lines.iter().enumerate() {
        if line.add_ons.len() > MAX_ADD_ONS_PER_LINE {
            return Err(AppError::validation(format!(
                "Line has too many add-ons ({}, max {MAX_ADD_ONS_PER_LINE})",
                line.add_ons.len()
            ))
            .with_detail("field", format!("lines[{i}].addOns")));
        }
        validate_quantity(line.quantity, &format!("lines[{i}].quantity"))?;
        validate_optional_text(&line.note, &format!("lines[{i}].note"), MAX_NOTE_LEN)?;
        for (j, add_on) in line.add_ons.iter().enumerate() {
            validate_quantity(add_on.quantity, &format!("lines[{i}].addOns[{j}].quantity"))?;
        }
    }
    Ok(())
}

/// Resolve `product_id` or apply the policy
///
/// `Ok(None)` means the reference was skipped.
fn resolve<'a>(
    entries: &'a HashMap<i64, CatalogEntry>,
    product_id: i64,
    policy: UnresolvedLinePolicy,
    skipped: &mut Vec<i64>,
) -> AppResult<Option<&'a CatalogEntry>> {
    if let Some(entry) = entries.get(&product_id) {
        return Ok(Some(entry));
    }
    match policy {
        UnresolvedLinePolicy::Skip => {
            tracing::warn!(product_id, "Product not in catalog, skipping");
            skipped.push(product_id);
            Ok(None)
        }
        UnresolvedLinePolicy::Reject => Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {product_id} not found"),
        )
        .with_detail("product_id", product_id)),
    }
}

/// Price a cart against the catalog
///
/// Pure: reads the catalog once, writes nothing. Input is validated before
/// the catalog is touched. An all-skipped cart yields an empty [`PricedOrder`];
/// deciding whether that is an error is up to the caller.
pub async fn price_order(
    catalog: &dyn CatalogLookup,
    policy: UnresolvedLinePolicy,
    lines: &[CartLine],
) -> AppResult<PricedOrder> {
    validate_cart(lines)?;

    let mut ids: Vec<i64> = lines
        .iter()
        .flat_map(|l| std::iter::once(l.product_id).chain(l.add_ons.iter().map(|a| a.product_id)))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let entries = catalog.lookup(&ids).await?;

    let mut priced = Vec::with_capacity(lines.len());
    let mut skipped = Vec::new();
    let mut total = Decimal::ZERO;

    for line in lines {
        let Some(product) = resolve(&entries, line.product_id, policy, &mut skipped)? else {
            continue;
        };

        let mut add_ons = Vec::with_capacity(line.add_ons.len());
        let mut add_on_sum = Decimal::ZERO;
        for add_on in &line.add_ons {
            let Some(entry) = resolve(&entries, add_on.product_id, policy, &mut skipped)? else {
                continue;
            };
            let price = to_decimal(entry.price);
            add_on_sum += price * Decimal::from(add_on.quantity);
            add_ons.push(PricedAddOn {
                product_id: entry.id,
                product_name: entry.name.clone(),
                unit_price: price,
                quantity: add_on.quantity,
            });
        }

        let base_price = to_decimal(product.price);
        let unit_price = base_price + add_on_sum;
        let line_total = unit_price * Decimal::from(line.quantity);
        total += line_total;

        priced.push(PricedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            base_price,
            unit_price,
            quantity: line.quantity,
            note: line.note.clone(),
            add_ons,
            line_total,
        });
    }

    Ok(PricedOrder {
        total_amount: round_money(total),
        lines: priced,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::money::to_f64;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory catalog that counts lookups
    #[derive(Default)]
    struct FakeCatalog {
        entries: HashMap<i64, CatalogEntry>,
        calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with(mut self, id: i64, name: &str, price: f64) -> Self {
            self.entries.insert(
                id,
                CatalogEntry {
                    id,
                    name: name.to_string(),
                    price,
                },
            );
            self
        }
    }

    #[async_trait]
    impl CatalogLookup for FakeCatalog {
        async fn lookup(&self, ids: &[i64]) -> AppResult<HashMap<i64, CatalogEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ids
                .iter()
                .filter_map(|id| self.entries.get(id).map(|e| (*id, e.clone())))
                .collect())
        }
    }

    struct DownCatalog;

    #[async_trait]
    impl CatalogLookup for DownCatalog {
        async fn lookup(&self, _ids: &[i64]) -> AppResult<HashMap<i64, CatalogEntry>> {
            Err(AppError::catalog_unavailable("connection refused"))
        }
    }

    fn menu() -> FakeCatalog {
        FakeCatalog::default()
            .with(1, "Hotdog", 12.50)
            .with(2, "Soda", 5.00)
            .with(3, "Queijo extra", 2.00)
            .with(4, "Bacon", 3.50)
    }

    #[tokio::test]
    async fn test_hotdog_and_soda() {
        let lines = vec![CartLine::new(1, 2), CartLine::new(2, 1)];
        let priced = price_order(&menu(), UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();

        assert_eq!(to_f64(priced.total_amount), 30.00);
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].line_total, Decimal::new(2500, 2));
        assert_eq!(priced.lines[0].product_name, "Hotdog");
        assert!(priced.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_total_rounded_once() {
        let catalog = FakeCatalog::default()
            .with(1, "A", 0.333)
            .with(2, "B", 0.333)
            .with(3, "C", 0.333);
        let lines = vec![CartLine::new(1, 1), CartLine::new(2, 1), CartLine::new(3, 1)];
        let priced = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();

        // Per-line rounding would give 0.99
        assert_eq!(to_f64(priced.total_amount), 1.00);
    }

    #[tokio::test]
    async fn test_total_matches_sum_of_quantity_times_price() {
        // Deterministic pseudo-random carts
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..50 {
            let mut catalog = FakeCatalog::default();
            let mut lines = Vec::new();
            let mut expected = Decimal::ZERO;
            let n = (next() % 6 + 1) as i64;
            for id in 1..=n {
                let cents = (next() % 10_000 + 1) as i64;
                let qty = (next() % 9 + 1) as i64;
                let price = Decimal::new(cents, 2);
                catalog = catalog.with(id, "item", cents as f64 / 100.0);
                lines.push(CartLine::new(id, qty));
                expected += price * Decimal::from(qty);
            }

            let priced = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
                .await
                .unwrap();
            assert_eq!(priced.total_amount, round_money(expected));
        }
    }

    #[tokio::test]
    async fn test_add_ons_priced_per_unit() {
        // (12.50 + 2×2.00 + 3.50) × 2 = 40.00
        let lines = vec![CartLine::new(1, 2).with_add_on(3, 2).with_add_on(4, 1)];
        let priced = price_order(&menu(), UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();

        let line = &priced.lines[0];
        assert_eq!(line.base_price, Decimal::new(1250, 2));
        assert_eq!(line.unit_price, Decimal::new(2000, 2));
        assert_eq!(line.add_ons.len(), 2);
        assert_eq!(to_f64(priced.total_amount), 40.00);
    }

    #[tokio::test]
    async fn test_skip_policy_drops_unknown_lines() {
        let lines = vec![
            CartLine::new(1, 1),
            CartLine::new(99, 3),
            CartLine::new(2, 1).with_add_on(98, 1),
        ];
        let priced = price_order(&menu(), UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();

        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.skipped, vec![99, 98]);
        assert_eq!(to_f64(priced.total_amount), 17.50);
    }

    #[tokio::test]
    async fn test_skip_policy_all_unknown_yields_empty() {
        let lines = vec![CartLine::new(99, 1)];
        let priced = price_order(&menu(), UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();
        assert!(priced.is_empty());
        assert_eq!(priced.total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_reject_policy_fails_whole_order() {
        let lines = vec![CartLine::new(1, 1), CartLine::new(99, 1)];
        let err = price_order(&menu(), UnresolvedLinePolicy::Reject, &lines)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
        assert_eq!(err.details.unwrap()["product_id"], 99);

        let lines = vec![CartLine::new(1, 1).with_add_on(77, 1)];
        let err = price_order(&menu(), UnresolvedLinePolicy::Reject, &lines)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_catalog_access() {
        let catalog = menu();

        let err = price_order(&catalog, UnresolvedLinePolicy::Skip, &[])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = price_order(&catalog, UnresolvedLinePolicy::Skip, &[CartLine::new(1, 0)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let lines = vec![CartLine::new(1, 1).with_add_on(3, -1)];
        let err = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        // 每行不同商品，超过上限
        let lines: Vec<_> = (1..=MAX_CART_LINES as i64 + 1).map(|id| CartLine::new(id, 1)).collect();
        let err = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap()["field"], "lines");

        let line = (0..=MAX_ADD_ONS_PER_LINE as i64)
            .fold(CartLine::new(1, 1), |line, id| line.with_add_on(id + 10, 1));
        let err = price_order(&catalog, UnresolvedLinePolicy::Skip, &[line])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap()["field"], "lines[0].addOns");

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cart_at_line_limit_is_priced() {
        let catalog = menu();
        let lines: Vec<_> = (0..MAX_CART_LINES).map(|_| CartLine::new(1, 1)).collect();
        let priced = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();
        assert_eq!(priced.lines.len(), MAX_CART_LINES);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_unavailable() {
        let err = price_order(&DownCatalog, UnresolvedLinePolicy::Skip, &[CartLine::new(1, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogUnavailable);
    }

    #[tokio::test]
    async fn test_duplicate_products_single_lookup() {
        let catalog = menu();
        let lines = vec![CartLine::new(1, 1), CartLine::new(1, 2).with_note("sem mostarda")];
        let priced = price_order(&catalog, UnresolvedLinePolicy::Skip, &lines)
            .await
            .unwrap();
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[1].note.as_deref(), Some("sem mostarda"));
        assert_eq!(to_f64(priced.total_amount), 37.50);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }
}
