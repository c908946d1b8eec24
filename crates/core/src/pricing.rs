//! Cart summary calculation.
//!
//! A [`CartSummary`] is derived, never stored: handlers recompute it from the
//! current lines, the applied coupon and the store's configured charges every
//! time they render a cart.
//!
//! # Rules
//!
//! - `subtotal` is the sum of every line's effective price times quantity.
//! - `discount` is the applied coupon's amount, clamped to the subtotal.
//! - `shipping` and `tax` come from the store's [`Charges`]. Percentage rates
//!   apply to `subtotal - discount`. An empty cart carries neither.
//! - `total = subtotal - discount + shipping + tax`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::Money;

/// A store-configured charge: either a flat amount or a percentage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Charge {
    /// A fixed amount per order.
    Flat(Money),
    /// A percentage of the discounted subtotal (`7.5` means 7.5%).
    Rate(Decimal),
}

impl Default for Charge {
    fn default() -> Self {
        Self::Flat(Money::ZERO)
    }
}

impl Charge {
    /// Amount this charge adds for an order whose discounted subtotal is `base`.
    #[must_use]
    pub fn amount_for(self, base: Money) -> Money {
        match self {
            Self::Flat(amount) => amount.non_negative(),
            Self::Rate(rate) => base.percent(rate).non_negative(),
        }
    }
}

/// Shipping and tax as configured for a store tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    #[serde(default)]
    pub shipping: Charge,
    #[serde(default)]
    pub tax: Charge,
}

/// Derived pricing for a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartSummary {
    /// Compute the summary for `items` with an optional coupon discount.
    #[must_use]
    pub fn compute(items: &[CartItem], coupon_discount: Option<Money>, charges: &Charges) -> Self {
        let subtotal: Money = items.iter().map(CartItem::line_total).sum();
        if items.is_empty() {
            return Self::default();
        }

        let discount = coupon_discount
            .map_or(Money::ZERO, Money::non_negative)
            .min(subtotal);
        let base = subtotal - discount;
        let shipping = charges.shipping.amount_for(base);
        let tax = charges.tax.amount_for(base);

        Self {
            subtotal,
            discount,
            shipping,
            tax,
            total: subtotal - discount + shipping + tax,
        }
    }

    /// Whether a coupon discount is part of this summary.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }
}
