//! Catalog products as served by the platform API.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// A sellable product in a store's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Price a shopper actually pays for one unit.
    ///
    /// The sale price wins only when it is positive and below the list price;
    /// any other sale price is treated as missing.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        effective_price(self.price, self.sale_price)
    }

    /// Whether a valid sale price is in effect.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective_price() != self.price
    }

    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Shared sale-price rule for products and cart lines.
pub(crate) fn effective_price(price: Money, sale_price: Option<Money>) -> Money {
    match sale_price {
        Some(sale) if sale.is_positive() && sale < price => sale,
        _ => price,
    }
}
