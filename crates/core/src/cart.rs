//! Cart line items and the quantity/stock guard.
//!
//! The storefront's cart is owned by the platform server and only mirrored
//! here for rendering; the POS cart is held entirely in the admin session.
//! Both go through the same [`guard_quantity`] rule so a stored quantity is
//! always within `1..=stock`.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, effective_price};
use crate::types::{CartItemId, Money, ProductId};

/// Errors from local cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No line with this ID is in the cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemId),
    /// The product has no stock left to add.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),
}

/// What to do when a shopper asks for fewer than one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Keep the line at quantity 1.
    #[default]
    Clamp,
    /// Drop the line from the cart.
    Remove,
}

/// Outcome of running a requested quantity through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Store this quantity (always within `1..=stock`).
    Set(u32),
    /// Remove the line.
    Remove,
}

/// Clamp a requested quantity into `1..=stock`.
///
/// Requests below one follow `policy`. A line whose stock is zero can't hold
/// any quantity and is always removed.
#[must_use]
pub fn guard_quantity(requested: i64, stock: u32, policy: QuantityPolicy) -> QuantityChange {
    if stock == 0 {
        return QuantityChange::Remove;
    }
    if requested < 1 {
        return match policy {
            QuantityPolicy::Clamp => QuantityChange::Set(1),
            QuantityPolicy::Remove => QuantityChange::Remove,
        };
    }
    let requested = u32::try_from(requested).unwrap_or(u32::MAX);
    QuantityChange::Set(requested.min(stock))
}

/// One line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Build a line for `product`, clamping `quantity` to the product's stock.
    #[must_use]
    pub fn from_product(id: CartItemId, product: &Product, quantity: u32) -> Self {
        Self {
            id,
            product_id: product.id,
            name: product.name.clone(),
            quantity: quantity.clamp(1, product.stock.max(1)),
            price: product.price,
            sale_price: product.sale_price,
            stock: product.stock,
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }

    /// Unit price after applying a valid sale price.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        effective_price(self.price, self.sale_price)
    }

    /// Whether a valid sale price is in effect.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective_price() != self.price
    }

    /// Effective price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.effective_price().times(self.quantity)
    }
}

/// An ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Wrap lines received from the platform.
    #[must_use]
    pub const fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn find(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product is incremented instead of
    /// duplicated. Either way the stored quantity is capped at stock. Locally
    /// held carts key their lines by product ID.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when the product has no stock.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> Result<&CartItem, CartError> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.id));
        }
        let quantity = quantity.max(1);

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            item.stock = product.stock;
            item.price = product.price;
            item.sale_price = product.sale_price;
            item.quantity = item.quantity.saturating_add(quantity).min(product.stock);
        } else {
            let id = CartItemId::new(product.id.as_i64());
            self.items.push(CartItem::from_product(id, product, quantity));
        }

        self.items
            .iter()
            .find(|item| item.product_id == product.id)
            .ok_or(CartError::OutOfStock(product.id))
    }

    /// Apply the quantity guard to one line and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line doesn't exist.
    pub fn set_quantity(
        &mut self,
        id: CartItemId,
        requested: i64,
        policy: QuantityPolicy,
    ) -> Result<QuantityChange, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))?;

        let change = match self.items.get(index) {
            Some(item) => guard_quantity(requested, item.stock, policy),
            None => return Err(CartError::ItemNotFound(id)),
        };
        match change {
            QuantityChange::Set(quantity) => {
                if let Some(item) = self.items.get_mut(index) {
                    item.quantity = quantity;
                }
            }
            QuantityChange::Remove => {
                self.items.remove(index);
            }
        }
        Ok(change)
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line doesn't exist.
    pub fn remove(&mut self, id: CartItemId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            slug: format!("product-{id}"),
            name: format!("Product {id}"),
            price: Money::from_major(100),
            sale_price: Some(Money::from_major(80)),
            stock,
            category: Some("Seating".to_string()),
            image: Some("/storage/products/chair.jpg".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_guard_clamps_into_stock_range() {
        assert_eq!(guard_quantity(3, 5, QuantityPolicy::Clamp), QuantityChange::Set(3));
        assert_eq!(guard_quantity(9, 5, QuantityPolicy::Clamp), QuantityChange::Set(5));
        assert_eq!(
            guard_quantity(i64::MAX, 5, QuantityPolicy::Remove),
            QuantityChange::Set(5)
        );
    }

    #[test]
    fn test_guard_below_one_follows_policy() {
        assert_eq!(guard_quantity(0, 5, QuantityPolicy::Clamp), QuantityChange::Set(1));
        assert_eq!(guard_quantity(-4, 5, QuantityPolicy::Clamp), QuantityChange::Set(1));
        assert_eq!(guard_quantity(0, 5, QuantityPolicy::Remove), QuantityChange::Remove);
    }

    #[test]
    fn test_guard_zero_stock_removes() {
        assert_eq!(guard_quantity(1, 0, QuantityPolicy::Clamp), QuantityChange::Remove);
    }

    #[test]
    fn test_guard_never_leaves_range() {
        for stock in 1..=6_u32 {
            for requested in -3..=10_i64 {
                for policy in [QuantityPolicy::Clamp, QuantityPolicy::Remove] {
                    if let QuantityChange::Set(q) = guard_quantity(requested, stock, policy) {
                        assert!((1..=stock).contains(&q), "{requested} -> {q} (stock {stock})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_add_product_merges_and_caps() {
        let mut cart = Cart::default();
        cart.add_product(&product(1, 4), 3).unwrap();
        let line = cart.add_product(&product(1, 4), 3).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_product_out_of_stock() {
        let mut cart = Cart::default();
        assert_eq!(
            cart.add_product(&product(2, 0), 1).unwrap_err(),
            CartError::OutOfStock(ProductId::new(2))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_updates_or_removes() {
        let mut cart = Cart::default();
        cart.add_product(&product(1, 5), 2).unwrap();
        let id = CartItemId::new(1);

        assert_eq!(
            cart.set_quantity(id, 12, QuantityPolicy::Clamp).unwrap(),
            QuantityChange::Set(5)
        );
        assert_eq!(cart.find(id).unwrap().quantity, 5);

        assert_eq!(
            cart.set_quantity(id, 0, QuantityPolicy::Remove).unwrap(),
            QuantityChange::Remove
        );
        assert!(cart.find(id).is_none());
        assert_eq!(
            cart.set_quantity(id, 1, QuantityPolicy::Clamp).unwrap_err(),
            CartError::ItemNotFound(id)
        );
    }

    #[test]
    fn test_line_total_uses_sale_price() {
        let item = CartItem::from_product(CartItemId::new(7), &product(7, 10), 2);
        assert_eq!(item.line_total(), Money::from_major(160));
        assert!(item.is_on_sale());
    }

    #[test]
    fn test_cart_serializes_as_array() {
        let mut cart = Cart::default();
        cart.add_product(&product(1, 5), 1).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
