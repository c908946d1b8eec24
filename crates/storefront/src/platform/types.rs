//! Resources returned by the platform API for the storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_core::{
    Cart, CartItem, CartSummary, Charge, Charges, CurrencyCode, CustomerId, Email, Money,
    ProductId, StoreId, ThemeSelection,
};

/// `{ "data": ... }` wrapper used by resource endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A store tenant as seen by its public storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub id: StoreId,
    pub name: String,
    pub slug: String,
    /// Theme tag chosen by the merchant; unknown or missing tags fall back
    /// to the default theme.
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub charges: Charges,
}

impl StoreProfile {
    /// Resolve this store's theme.
    #[must_use]
    pub fn theme_selection(&self) -> ThemeSelection {
        ThemeSelection::dispatch(self.theme.as_deref())
    }
}

/// Server-side cart for one visitor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartResource {
    /// Opaque cart token, kept in the visitor's session.
    pub token: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl CartResource {
    #[must_use]
    pub fn into_cart(self) -> Cart {
        Cart::new(self.items)
    }
}

/// Body for adding a product to a cart.
#[derive(Debug, Serialize)]
pub(crate) struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for changing a line's quantity.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateItemRequest {
    pub quantity: u32,
}

/// Body for `POST /api/coupon/validate`.
#[derive(Debug, Serialize)]
pub(crate) struct CouponRequest<'a> {
    pub store_id: StoreId,
    pub code: &'a str,
}

/// A placed order, shown on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    pub number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub tax: Money,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Summary of the order as charged.
    ///
    /// Shipping and tax were fixed when the order was placed, so they are
    /// replayed as flat amounts.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let charges = Charges {
            shipping: Charge::Flat(self.shipping),
            tax: Charge::Flat(self.tax),
        };
        let discount = self.discount.is_positive().then_some(self.discount);
        CartSummary::compute(&self.items, discount, &charges)
    }
}

/// The signed-in customer's profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub orders_count: u32,
    #[serde(default)]
    pub recent_orders: Vec<OrderSummary>,
}

/// One row in the profile's order history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderSummary {
    pub number: String,
    #[serde(default)]
    pub status: String,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}
