//! Tax and shipping rules plus the totals derived from them.
//!
//! The cart summary and the checkout page historically disagree on the tax
//! rate, so each surface carries its own [`PricingRules`]. Tax is always
//! charged on the merchandise subtotal, never on shipping.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::types::{Price, ShippingMethod};

/// Rates applied when turning cart lines into totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Fractional tax rate, e.g. `0.08`.
    pub tax_rate: Decimal,
}

impl PricingRules {
    /// Rules for the checkout page and persisted orders (8% tax).
    #[must_use]
    pub fn checkout() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
        }
    }

    /// Rules for the slide-out cart summary (10% tax).
    #[must_use]
    pub fn cart_summary() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
        }
    }

    /// Same rules with a different tax rate.
    #[must_use]
    pub const fn with_tax_rate(self, tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    /// Flat delivery charge for a shipping method.
    #[must_use]
    pub fn shipping_cost(&self, method: ShippingMethod) -> Price {
        match method {
            ShippingMethod::Standard => Price::ZERO,
            ShippingMethod::Express => Price::from_cents(999),
            ShippingMethod::Overnight => Price::from_cents(2499),
        }
    }

    /// Tax owed on `subtotal`.
    #[must_use]
    pub fn tax_on(&self, subtotal: Price) -> Price {
        subtotal.at_rate(self.tax_rate)
    }
}

/// Read-out shown in the cart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub savings: Price,
    pub tax: Price,
    pub total: Price,
    /// Units across all lines.
    pub item_count: u64,
}

pub(crate) fn cart_totals(lines: &[CartLine], rules: &PricingRules) -> CartTotals {
    let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
    let savings: Price = lines.iter().map(CartLine::line_savings).sum();
    let tax = rules.tax_on(subtotal);
    CartTotals {
        subtotal,
        savings,
        tax,
        total: subtotal + tax,
        item_count: lines.iter().map(|line| u64::from(line.quantity)).sum(),
    }
}

/// Totals of an order at checkout, including delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub savings: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Compute totals for `lines` shipped with `method`.
    #[must_use]
    pub fn compute(lines: &[CartLine], method: ShippingMethod, rules: &PricingRules) -> Self {
        let cart = cart_totals(lines, rules);
        let shipping = rules.shipping_cost(method);
        Self {
            subtotal: cart.subtotal,
            savings: cart.savings,
            shipping,
            tax: cart.tax,
            total: cart.subtotal + shipping + cart.tax,
        }
    }

    /// Totals from already-priced `(unit price, original price, quantity)`
    /// triples, used when prices come from the catalog rather than a cart.
    #[must_use]
    pub fn from_priced<I>(priced: I, method: ShippingMethod, rules: &PricingRules) -> Self
    where
        I: IntoIterator<Item = (Price, Price, u32)>,
    {
        let mut subtotal = Price::ZERO;
        let mut savings = Price::ZERO;
        for (price, original, quantity) in priced {
            subtotal += price.times(quantity);
            savings += (original - price).times(quantity);
        }
        let shipping = rules.shipping_cost(method);
        let tax = rules.tax_on(subtotal);
        Self {
            subtotal,
            savings,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn line(price_cents: i64, original_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::from("p"),
            name: "P".to_string(),
            price: Price::from_cents(price_cents),
            original_price: Price::from_cents(original_cents),
            image: String::new(),
            selected_color: None,
            selected_storage: None,
            quantity,
        }
    }

    #[test]
    fn test_cart_totals_sum_lines() {
        let lines = [line(99_900, 109_900, 2), line(2_999, 2_999, 1)];
        let totals = cart_totals(&lines, &PricingRules::cart_summary());

        assert_eq!(totals.subtotal, Price::from_cents(202_799));
        assert_eq!(totals.savings, Price::from_units(200));
        assert_eq!(totals.item_count, 3);
        // 2027.99 * 0.10 = 202.799
        assert_eq!(totals.tax, Price::from_cents(20_280));
        assert_eq!(totals.total, Price::from_cents(223_079));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = cart_totals(&[], &PricingRules::checkout());
        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.total, Price::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_surfaces_use_different_rates() {
        let lines = [line(10_000, 10_000, 1)];
        let cart = cart_totals(&lines, &PricingRules::cart_summary());
        let checkout = cart_totals(&lines, &PricingRules::checkout());
        assert_eq!(cart.tax, Price::from_units(10));
        assert_eq!(checkout.tax, Price::from_units(8));
    }

    #[test]
    fn test_order_totals_add_shipping_without_taxing_it() {
        let lines = [line(10_000, 12_000, 1)];
        let totals = OrderTotals::compute(&lines, ShippingMethod::Overnight, &PricingRules::checkout());

        assert_eq!(totals.shipping, Price::from_cents(2499));
        assert_eq!(totals.tax, Price::from_units(8));
        assert_eq!(totals.savings, Price::from_units(20));
        assert_eq!(totals.total, Price::from_cents(13_299));
    }

    #[test]
    fn test_from_priced_matches_compute() {
        let lines = [line(99_900, 109_900, 2), line(1_500, 2_000, 3)];
        let rules = PricingRules::checkout();
        let from_lines = OrderTotals::compute(&lines, ShippingMethod::Express, &rules);
        let from_priced = OrderTotals::from_priced(
            lines.iter().map(|l| (l.price, l.original_price, l.quantity)),
            ShippingMethod::Express,
            &rules,
        );
        assert_eq!(from_lines, from_priced);
    }

    #[test]
    fn test_with_tax_rate_overrides() {
        let rules = PricingRules::checkout().with_tax_rate(Decimal::ZERO);
        assert_eq!(rules.tax_on(Price::from_units(100)), Price::ZERO);
    }
}
