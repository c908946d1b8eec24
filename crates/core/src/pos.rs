//! Point-of-sale cart and selected customer.
//!
//! A [`PosSession`] is the in-memory form of what the admin keeps under three
//! session keys. The admin loads it once per request, mutates it, and writes
//! it back; logging out discards it. The cart belongs to one store at a time:
//! binding the register to another store empties it.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartError, CartItem, QuantityChange, QuantityPolicy};
use crate::catalog::Product;
use crate::pricing::{CartSummary, Charges};
use crate::types::{CartItemId, CustomerId, Email, StoreId};

/// Session key holding the JSON-serialized POS cart.
pub const CART_KEY: &str = "pos_cart";

/// Session key holding the JSON-serialized selected customer.
pub const CUSTOMER_KEY: &str = "pos_selected_customer";

/// Session key holding the ID of the store the cart was rung up in.
pub const STORE_KEY: &str = "pos_store";

/// A customer the cashier has attached to the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosCustomer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POS state for one cashier session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosSession {
    store: Option<StoreId>,
    cart: Cart,
    customer: Option<PosCustomer>,
}

impl PosSession {
    /// Rebuild the session from its stored parts.
    #[must_use]
    pub const fn restore(
        store: Option<StoreId>,
        cart: Cart,
        customer: Option<PosCustomer>,
    ) -> Self {
        Self {
            store,
            cart,
            customer,
        }
    }

    /// The store the cart belongs to, once one has been chosen.
    #[must_use]
    pub const fn store(&self) -> Option<StoreId> {
        self.store
    }

    /// Point the register at `store`.
    ///
    /// Lines rung up in another store are dropped, since their prices, stock
    /// and line IDs mean nothing here. The selected customer stays. Returns
    /// whether anything changed.
    pub fn bind_store(&mut self, store: StoreId) -> bool {
        if self.store == Some(store) {
            return false;
        }
        self.store = Some(store);
        self.cart.clear();
        true
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn customer(&self) -> Option<&PosCustomer> {
        self.customer.as_ref()
    }

    /// Ring up `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when the product has no stock.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<&CartItem, CartError> {
        self.cart.add_product(product, quantity)
    }

    /// Change a line's quantity. The register never drops a line implicitly;
    /// quantities below one clamp to one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line doesn't exist.
    pub fn set_quantity(
        &mut self,
        id: CartItemId,
        requested: i64,
    ) -> Result<QuantityChange, CartError> {
        self.cart.set_quantity(id, requested, QuantityPolicy::Clamp)
    }

    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line doesn't exist.
    pub fn remove(&mut self, id: CartItemId) -> Result<CartItem, CartError> {
        self.cart.remove(id)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Attach a customer to the sale, or detach with `None`.
    pub fn select_customer(&mut self, customer: Option<PosCustomer>) {
        self.customer = customer;
    }

    /// Pricing for the current sale.
    #[must_use]
    pub fn summary(&self, charges: &Charges) -> CartSummary {
        CartSummary::compute(self.cart.items(), None, charges)
    }

    /// Split into the parts stored under [`STORE_KEY`], [`CART_KEY`] and
    /// [`CUSTOMER_KEY`].
    #[must_use]
    pub fn into_parts(self) -> (Option<StoreId>, Cart, Option<PosCustomer>) {
        (self.store, self.cart, self.customer)
    }
}
