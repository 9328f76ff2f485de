//! Cart arithmetic and the session-stored guest cart.
//!
//! A cart is either the open order of an authenticated customer or a
//! [`GuestCart`] kept in the visitor's session. Both are resolved into
//! [`CartLine`]s and summarised the same way.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// A cart action sent by the storefront's add/remove buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    /// Add one unit.
    Add,
    /// Remove one unit.
    Remove,
}

impl CartAction {
    /// Quantity change applied by this action.
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::Add => 1,
            Self::Remove => -1,
        }
    }
}

/// One product line in a cart, with the product fields totals depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub shipping: Money,
    pub digital: bool,
    pub quantity: u32,
    pub image_url: String,
}

impl CartLine {
    /// Line total: `price * quantity + shipping`.
    ///
    /// Shipping is a flat charge per line, not per unit.
    #[must_use]
    pub fn total(&self) -> Money {
        self.price * self.quantity + self.shipping
    }

    /// Whether this line has to be physically delivered.
    #[must_use]
    pub const fn needs_shipping(&self) -> bool {
        !self.digital
    }
}

/// Totals over a set of cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    /// Sum of quantities.
    pub item_count: u32,
    /// Sum of line totals.
    pub total: Money,
    /// True if any line is a physical product.
    pub needs_shipping: bool,
}

impl CartSummary {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            item_count: 0,
            total: Money::ZERO,
            needs_shipping: false,
        }
    }

    /// Summarise the given lines. Lines with zero quantity are dropped.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let lines: Vec<CartLine> = lines.into_iter().filter(|l| l.quantity > 0).collect();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        let total = lines.iter().map(CartLine::total).sum();
        let needs_shipping = lines.iter().any(CartLine::needs_shipping);

        Self {
            lines,
            item_count,
            total,
            needs_shipping,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Whether a client-submitted payment total reconciles with the computed cart
/// total. Decimal equality, so `10.5` matches `10.50`.
#[must_use]
pub fn totals_match(submitted: Money, computed: Money) -> bool {
    submitted == computed
}

/// A guest entry: product and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart of an unauthenticated visitor, serialised into the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCart {
    entries: Vec<GuestCartEntry>,
}

impl GuestCart {
    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[GuestCartEntry] {
        &self.entries
    }

    /// Quantity held for a product (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.product_id == product_id)
            .map_or(0, |e| e.quantity)
    }

    /// Apply an add/remove action. An entry whose quantity reaches zero is removed.
    pub fn apply(&mut self, product_id: ProductId, action: CartAction) {
        match self.entries.iter().position(|e| e.product_id == product_id) {
            Some(index) => {
                let remove = self.entries.get_mut(index).is_some_and(|entry| {
                    match action {
                        CartAction::Add => entry.quantity = entry.quantity.saturating_add(1),
                        CartAction::Remove => entry.quantity = entry.quantity.saturating_sub(1),
                    }
                    entry.quantity == 0
                });
                if remove {
                    self.entries.remove(index);
                }
            }
            None => {
                if action == CartAction::Add {
                    self.entries.push(GuestCartEntry {
                        product_id,
                        quantity: 1,
                    });
                }
            }
        }
    }

    /// Drop entries for products that no longer exist.
    pub fn retain_products(&mut self, known: &[ProductId]) {
        self.entries.retain(|e| known.contains(&e.product_id));
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: &str, shipping: &str, digital: bool, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::parse(price).unwrap(),
            shipping: Money::parse(shipping).unwrap(),
            digital,
            quantity,
            image_url: String::new(),
        }
    }

    #[test]
    fn line_total_adds_shipping_once() {
        let l = line(1, "1500.00", "500.00", false, 3);
        assert_eq!(l.total(), Money::parse("5000.00").unwrap());
    }

    #[test]
    fn summary_sums_subtotals_and_shipping() {
        let summary = CartSummary::from_lines(vec![
            line(1, "1000", "200", false, 2),
            line(2, "350.50", "0", true, 1),
        ]);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, Money::parse("2550.50").unwrap());
        assert!(summary.needs_shipping);
    }

    #[test]
    fn digital_only_cart_needs_no_shipping() {
        let summary = CartSummary::from_lines(vec![line(1, "10", "0", true, 4)]);
        assert!(!summary.needs_shipping);
    }

    #[test]
    fn zero_quantity_lines_are_ignored() {
        let summary = CartSummary::from_lines(vec![line(1, "10", "5", false, 0)]);
        assert!(summary.is_empty());
        assert_eq!(summary.total, Money::ZERO);
        assert!(!summary.needs_shipping);
    }

    #[test]
    fn totals_reconcile_only_on_exact_match() {
        let computed = Money::parse("2550.50").unwrap();
        assert!(totals_match(Money::parse("2550.5").unwrap(), computed));
        assert!(!totals_match(Money::parse("2550.49").unwrap(), computed));
        assert!(!totals_match(Money::ZERO, computed));
    }

    #[test]
    fn guest_cart_add_and_remove() {
        let mut cart = GuestCart::default();
        let id = ProductId::new(5);
        cart.apply(id, CartAction::Add);
        cart.apply(id, CartAction::Add);
        assert_eq!(cart.quantity_of(id), 2);
        cart.apply(id, CartAction::Remove);
        assert_eq!(cart.quantity_of(id), 1);
        cart.apply(id, CartAction::Remove);
        assert!(cart.is_empty());
    }

    #[test]
    fn removing_absent_product_is_a_no_op() {
        let mut cart = GuestCart::default();
        cart.apply(ProductId::new(1), CartAction::Remove);
        assert!(cart.is_empty());
    }

    #[test]
    fn retain_drops_unknown_products() {
        let mut cart = GuestCart::default();
        cart.apply(ProductId::new(1), CartAction::Add);
        cart.apply(ProductId::new(2), CartAction::Add);
        cart.retain_products(&[ProductId::new(2)]);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 0);
    }

    #[test]
    fn guest_cart_survives_json() {
        let mut cart = GuestCart::default();
        cart.apply(ProductId::new(3), CartAction::Add);
        let value = serde_json::to_value(&cart).unwrap();
        let back: GuestCart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn actions_parse_lowercase_only() {
        assert_eq!(
            serde_json::from_str::<CartAction>("\"add\"").unwrap(),
            CartAction::Add
        );
        assert!(serde_json::from_str::<CartAction>("\"delete\"").is_err());
    }
}
