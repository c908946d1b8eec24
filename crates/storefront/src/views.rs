//! Display data for templates.
//!
//! Every page is rendered by one template per concern; the store's
//! [`ThemeConfig`] carries everything that differs between themes.

use vitrine_core::{
    Cart, CartItem, CartSummary, CouponState, CurrencyCode, Product, ThemeConfig,
};

use crate::platform::StoreProfile;

/// The store tenant and its resolved theme.
#[derive(Clone, Debug)]
pub struct StoreView {
    pub name: String,
    pub slug: String,
    pub currency: CurrencyCode,
    pub theme: &'static ThemeConfig,
}

impl StoreView {
    /// Base path of this store's pages, e.g. `/s/little-ones`.
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("/s/{}", self.slug)
    }

    #[must_use]
    pub fn price(&self, amount: vitrine_core::Money) -> String {
        self.currency.format(amount)
    }
}

impl From<&StoreProfile> for StoreView {
    fn from(store: &StoreProfile) -> Self {
        let selection = store.theme_selection();
        if let vitrine_core::ThemeSelection::Fallback {
            requested: Some(tag),
        } = &selection
        {
            tracing::debug!(store = %store.slug, tag = %tag, "Unknown theme tag, using default");
        }
        Self {
            name: store.name.clone(),
            slug: store.slug.clone(),
            currency: store.currency,
            theme: selection.config(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Product card on the catalog grid.
#[derive(Clone, Debug)]
pub struct ProductCardView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub price: String,
    /// List price, shown struck through when on sale.
    pub compare_at: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub in_stock: bool,
    pub stock: u32,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i64(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: currency.format(product.effective_price()),
            compare_at: product
                .is_on_sale()
                .then(|| currency.format(product.price)),
            category: product.category.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            in_stock: product.in_stock(),
            stock: product.stock,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub stock: u32,
    pub unit_price: String,
    pub compare_at: Option<String>,
    pub line_total: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl CartLineView {
    #[must_use]
    pub fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            quantity: item.quantity,
            stock: item.stock,
            unit_price: currency.format(item.effective_price()),
            compare_at: item.is_on_sale().then(|| currency.format(item.price)),
            line_total: currency.format(item.line_total()),
            category: item.category.clone(),
            image: item.image.clone(),
        }
    }
}

/// Formatted cart summary.
#[derive(Clone, Debug)]
pub struct SummaryView {
    pub subtotal: String,
    /// Present only when a discount applies.
    pub discount: Option<String>,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl SummaryView {
    #[must_use]
    pub fn new(summary: &CartSummary, currency: CurrencyCode) -> Self {
        Self {
            subtotal: currency.format(summary.subtotal),
            discount: summary
                .has_discount()
                .then(|| format!("-{}", currency.format(summary.discount))),
            shipping: currency.format(summary.shipping),
            tax: currency.format(summary.tax),
            total: currency.format(summary.total),
        }
    }
}

/// Cart page or fragment data.
#[derive(Clone, Debug)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub summary: SummaryView,
    /// Code of the applied coupon, if any.
    pub coupon_code: Option<String>,
}

impl CartView {
    /// Build the view, computing the summary from the cart, coupon and the
    /// store's charges.
    #[must_use]
    pub fn build(
        cart: &Cart,
        coupon: &CouponState,
        charges: &vitrine_core::Charges,
        currency: CurrencyCode,
    ) -> Self {
        let summary = CartSummary::compute(cart.items(), coupon.discount(), charges);
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView::new(item, currency))
                .collect(),
            item_count: cart.item_count(),
            summary: SummaryView::new(&summary, currency),
            coupon_code: coupon.applied().map(|applied| applied.code.clone()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A one-line message shown above a fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::{
        CartItemId, Charge, Charges, CouponValidation, Money, ProductId, QuantityPolicy,
        StoreId, StoreTheme,
    };

    use super::*;

    fn item() -> CartItem {
        CartItem {
            id: CartItemId::new(11),
            product_id: ProductId::new(4),
            name: "Walnut Side Table".to_string(),
            quantity: 2,
            price: Money::from_major(100),
            sale_price: Some(Money::from_major(80)),
            stock: 6,
            category: Some("Tables".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_store_view_resolves_theme() {
        let store = StoreProfile {
            id: StoreId::new(2),
            name: "Little Ones".to_string(),
            slug: "little-ones".to_string(),
            theme: Some("baby-kids".to_string()),
            currency: CurrencyCode::USD,
            charges: Charges::default(),
        };
        let view = StoreView::from(&store);
        assert_eq!(view.theme, StoreTheme::BabyKids.config());
        assert_eq!(view.theme.quantity_policy, QuantityPolicy::Remove);
        assert_eq!(view.base_path(), "/s/little-ones");
    }

    #[test]
    fn test_cart_view_formats_sale_and_coupon() {
        let cart = Cart::new(vec![item()]);
        let charges = Charges {
            shipping: Charge::Flat(Money::from_major(10)),
            tax: Charge::Flat(Money::from_major(5)),
        };
        let mut coupon = CouponState::Idle;
        coupon
            .apply_validation(
                "SAVE20",
                CouponValidation {
                    valid: true,
                    discount: Money::from_major(20),
                    message: None,
                },
            )
            .unwrap();

        let view = CartView::build(&cart, &coupon, &charges, CurrencyCode::USD);
        let line = view.lines.first().unwrap();
        assert_eq!(line.unit_price, "$80.00");
        assert_eq!(line.compare_at.as_deref(), Some("$100.00"));
        assert_eq!(line.line_total, "$160.00");
        assert_eq!(view.summary.discount.as_deref(), Some("-$20.00"));
        assert_eq!(view.summary.total, "$155.00");
        assert_eq!(view.coupon_code.as_deref(), Some("SAVE20"));
        assert_eq!(view.item_count, 2);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::build(
            &Cart::default(),
            &CouponState::Idle,
            &Charges::default(),
            CurrencyCode::EUR,
        );
        assert!(view.is_empty());
        assert_eq!(view.summary.total, "\u{20ac}0.00");
        assert!(view.summary.discount.is_none());
    }
}
