//! The cart store.
//!
//! A [`CartState`] is changed only by applying a [`CartAction`]. Applying an
//! action never mutates the receiver: it returns the next state, so callers
//! can keep earlier snapshots for undo or replay.
//!
//! # Invariants
//!
//! - At most one line per [`LineKey`] (product id + color + storage).
//! - Every line has `quantity >= 1`; setting a quantity to zero or below
//!   removes the line instead.
//! - Lines keep insertion order, which is also display order.
//!
//! # Stock
//!
//! Actions are infallible and do not consult inventory. A cart may hold more
//! units than the catalog has in stock; only the server-side order endpoint
//! checks stock.
//!
//! # Example
//!
//! ```rust
//! use sable_core::{CartAction, CartState, NewCartLine, Price, ProductId};
//!
//! let phone = NewCartLine {
//!     id: ProductId::from("p1"),
//!     name: "Phone X".into(),
//!     price: Price::from_units(999),
//!     original_price: Price::from_units(1099),
//!     image: String::new(),
//!     selected_color: Some("Black".into()),
//!     selected_storage: Some("256GB".into()),
//! };
//!
//! let cart = CartState::new()
//!     .apply(CartAction::AddItem(phone.clone()))
//!     .apply(CartAction::AddItem(phone));
//!
//! assert_eq!(cart.items().len(), 1);
//! assert_eq!(cart.item_count(), 2);
//! ```

mod line;

pub use line::{CartLine, CartLineError, LineKey, NewCartLine};

use serde::{Deserialize, Serialize};

use crate::pricing::{self, CartTotals, PricingRules};
use crate::types::ProductId;

/// Everything that can happen to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Add one unit of a product variant.
    ///
    /// Does not open the panel; callers that want it visible follow up with
    /// [`CartAction::OpenCart`].
    AddItem(NewCartLine),
    /// Remove every line for this product id, whatever its variant.
    RemoveItem { id: ProductId },
    /// Set the quantity of every line for this product id.
    ///
    /// A quantity of zero or below removes those lines.
    UpdateQuantity { id: ProductId, quantity: i64 },
    /// Remove exactly the line at this key.
    RemoveLine(LineKey),
    /// Remove all lines.
    Clear,
    OpenCart,
    CloseCart,
    ToggleCart,
}

/// The in-progress cart of one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    items: Vec<CartLine>,
    is_open: bool,
}

impl CartState {
    /// An empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the state that results from `action`.
    #[must_use]
    pub fn apply(&self, action: CartAction) -> Self {
        let mut next = self.clone();
        next.reduce(action);
        next
    }

    fn reduce(&mut self, action: CartAction) {
        match action {
            CartAction::AddItem(line) => {
                let key = line.key();
                match self.items.iter_mut().find(|existing| existing.matches(&key)) {
                    Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
                    None => self.items.push(line.with_quantity(1)),
                }
            }
            CartAction::RemoveItem { id } => self.items.retain(|line| line.id != id),
            CartAction::UpdateQuantity { id, quantity } => {
                if quantity <= 0 {
                    self.items.retain(|line| line.id != id);
                } else {
                    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                    for line in self.items.iter_mut().filter(|line| line.id == id) {
                        line.quantity = quantity;
                    }
                }
            }
            CartAction::RemoveLine(key) => self.items.retain(|line| !line.matches(&key)),
            CartAction::Clear => self.items.clear(),
            CartAction::OpenCart => self.is_open = true,
            CartAction::CloseCart => self.is_open = false,
            CartAction::ToggleCart => self.is_open = !self.is_open,
        }
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    /// Whether the slide-out panel is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The line at `key`, if present.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.items.iter().find(|line| line.matches(key))
    }

    /// Derived totals for the cart summary.
    #[must_use]
    pub fn totals(&self, rules: &PricingRules) -> CartTotals {
        pricing::cart_totals(&self.items, rules)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn phone(color: &str, storage: &str) -> NewCartLine {
        NewCartLine {
            id: ProductId::from("p1"),
            name: "Phone X".to_string(),
            price: Price::from_units(999),
            original_price: Price::from_units(1099),
            image: "/img/phone-x.png".to_string(),
            selected_color: Some(color.to_string()),
            selected_storage: Some(storage.to_string()),
        }
    }

    fn product(id: &str, price: i64) -> NewCartLine {
        NewCartLine {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            price: Price::from_units(price),
            original_price: Price::from_units(price),
            image: String::new(),
            selected_color: None,
            selected_storage: None,
        }
    }

    fn ids(cart: &CartState) -> Vec<&str> {
        cart.items().iter().map(|line| line.id.as_str()).collect()
    }

    #[test]
    fn test_new_cart_is_empty_and_closed() {
        let cart = CartState::new();
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_add_same_variant_twice_increments_quantity() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(phone("Black", "256GB")))
            .apply(CartAction::AddItem(phone("Black", "256GB")));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_add_different_variant_appends_line() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(phone("Black", "256GB")))
            .apply(CartAction::AddItem(phone("White", "256GB")))
            .apply(CartAction::AddItem(phone("Black", "512GB")));

        assert_eq!(cart.items().len(), 3);
        assert!(cart.items().iter().all(|line| line.quantity == 1));
    }

    #[test]
    fn test_add_does_not_open_panel() {
        let cart = CartState::new().apply(CartAction::AddItem(product("a", 1)));
        assert!(!cart.is_open());
    }

    #[test]
    fn test_apply_leaves_previous_state_untouched() {
        let before = CartState::new().apply(CartAction::AddItem(product("a", 10)));
        let snapshot = before.clone();

        let after = before.apply(CartAction::AddItem(product("a", 10)));
        let _ = before.apply(CartAction::Clear);

        assert_eq!(before, snapshot);
        assert_eq!(after.items()[0].quantity, 2);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 10)))
            .apply(CartAction::UpdateQuantity {
                id: ProductId::from("a"),
                quantity: 0,
            });
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes_line() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 10)))
            .apply(CartAction::AddItem(product("b", 10)))
            .apply(CartAction::UpdateQuantity {
                id: ProductId::from("a"),
                quantity: -3,
            });
        assert_eq!(ids(&cart), vec!["b"]);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 10)))
            .apply(CartAction::UpdateQuantity {
                id: ProductId::from("a"),
                quantity: 5,
            });
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let cart = CartState::new().apply(CartAction::AddItem(product("a", 10)));
        let next = cart.apply(CartAction::UpdateQuantity {
            id: ProductId::from("zzz"),
            quantity: 4,
        });
        assert_eq!(cart, next);
    }

    #[test]
    fn test_quantity_never_drops_below_one() {
        let mut cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 1)))
            .apply(CartAction::AddItem(product("b", 1)));
        for q in [3, 0, -1, 2, i64::MIN, i64::MAX] {
            cart = cart.apply(CartAction::UpdateQuantity {
                id: ProductId::from("b"),
                quantity: q,
            });
            assert!(cart.items().iter().all(|line| line.quantity >= 1));
        }
    }

    #[test]
    fn test_remove_middle_line_preserves_order() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 1)))
            .apply(CartAction::AddItem(product("b", 1)))
            .apply(CartAction::AddItem(product("c", 1)))
            .apply(CartAction::AddItem(product("d", 1)))
            .apply(CartAction::RemoveItem {
                id: ProductId::from("b"),
            });
        assert_eq!(ids(&cart), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_remove_item_drops_every_variant_of_id() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(phone("Black", "256GB")))
            .apply(CartAction::AddItem(product("case", 29)))
            .apply(CartAction::AddItem(phone("White", "128GB")))
            .apply(CartAction::RemoveItem {
                id: ProductId::from("p1"),
            });
        assert_eq!(ids(&cart), vec!["case"]);
    }

    #[test]
    fn test_update_quantity_touches_every_variant_of_id() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(phone("Black", "256GB")))
            .apply(CartAction::AddItem(phone("White", "128GB")))
            .apply(CartAction::UpdateQuantity {
                id: ProductId::from("p1"),
                quantity: 3,
            });
        assert!(cart.items().iter().all(|line| line.quantity == 3));
    }

    #[test]
    fn test_remove_line_is_variant_exact() {
        let black = phone("Black", "256GB");
        let cart = CartState::new()
            .apply(CartAction::AddItem(black.clone()))
            .apply(CartAction::AddItem(phone("White", "128GB")))
            .apply(CartAction::RemoveLine(black.key()));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].selected_color.as_deref(), Some("White"));
        assert!(cart.find(&black.key()).is_none());
    }

    #[test]
    fn test_panel_visibility_actions() {
        let cart = CartState::new().apply(CartAction::OpenCart);
        assert!(cart.is_open());
        let cart = cart.apply(CartAction::CloseCart);
        assert!(!cart.is_open());
        let cart = cart.apply(CartAction::ToggleCart);
        assert!(cart.is_open());
        let cart = cart.apply(CartAction::ToggleCart);
        assert!(!cart.is_open());
    }

    #[test]
    fn test_visibility_does_not_touch_items() {
        let cart = CartState::new().apply(CartAction::AddItem(product("a", 5)));
        let toggled = cart.apply(CartAction::ToggleCart);
        assert_eq!(cart.items(), toggled.items());
    }

    #[test]
    fn test_clear() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(product("a", 5)))
            .apply(CartAction::OpenCart)
            .apply(CartAction::Clear);
        assert!(cart.is_empty());
        assert!(cart.is_open());
    }

    #[test]
    fn test_example_scenario_totals() {
        let cart = CartState::new()
            .apply(CartAction::AddItem(phone("Black", "256GB")))
            .apply(CartAction::AddItem(phone("Black", "256GB")));

        let totals = cart.totals(&PricingRules::cart_summary());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(totals.subtotal, Price::from_units(1998));
        assert_eq!(totals.savings, Price::from_units(200));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_out_of_range_lines_total_without_panicking() {
        let mut huge = product("big", 0);
        huge.price = Price::new("50000000000000000000000000000".parse().unwrap());
        huge.original_price = huge.price;
        assert!(huge.validate().is_err());

        let cart = CartState::new()
            .apply(CartAction::AddItem(huge.clone()))
            .apply(CartAction::AddItem(huge));
        let totals = cart.totals(&PricingRules::checkout());
        assert!(totals.total >= totals.subtotal);
    }

    #[test]
    fn test_validate_line_prices() {
        assert!(phone("Black", "256GB").validate().is_ok());

        let mut negative = phone("Black", "256GB");
        negative.price = Price::from_cents(-1);
        assert_eq!(
            negative.validate().unwrap_err(),
            CartLineError::PriceOutOfRange("price")
        );

        let mut inflated = phone("Black", "256GB");
        inflated.original_price = Price::from_units(crate::types::MAX_UNIT_PRICE + 1);
        assert_eq!(
            inflated.validate().unwrap_err(),
            CartLineError::PriceOutOfRange("original_price")
        );
    }

    #[test]
    fn test_largest_valid_line_totals_exactly() {
        let mut line = product("big", crate::types::MAX_UNIT_PRICE);
        line.original_price = line.price;
        let cart = CartState::new()
            .apply(CartAction::AddItem(line))
            .apply(CartAction::UpdateQuantity {
                id: ProductId::from("big"),
                quantity: i64::MAX,
            });
        let totals = cart.totals(&PricingRules::cart_summary());
        assert_eq!(
            totals.subtotal,
            Price::from_units(crate::types::MAX_UNIT_PRICE).times(u32::MAX)
        );
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn test_action_wire_format() {
        let action: CartAction =
            serde_json::from_str(r#"{"type":"update_quantity","id":"p1","quantity":0}"#).unwrap();
        assert_eq!(
            action,
            CartAction::UpdateQuantity {
                id: ProductId::from("p1"),
                quantity: 0
            }
        );
    }
}
