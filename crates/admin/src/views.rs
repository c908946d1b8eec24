//! Display data for admin templates and JSON responses.

use serde::Serialize;
use vitrine_core::{
    CartItem, CurrencyCode, MediaItem, MediaSelection, PosCustomer, PosSession, Product,
};

use crate::models::CurrentOperator;
use crate::platform::StoreSummary;

/// Operator shown in the admin chrome.
#[derive(Debug, Clone)]
pub struct OperatorView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentOperator> for OperatorView {
    fn from(operator: &CurrentOperator) -> Self {
        Self {
            name: operator.name.clone(),
            email: operator.email.to_string(),
        }
    }
}

// =============================================================================
// Media
// =============================================================================

/// A media library entry, as rendered in the picker and returned as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItemView {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub preview_url: String,
    /// Storage path written into the form field when picked.
    pub path: String,
    pub size: String,
    pub is_image: bool,
    pub selected: bool,
}

impl MediaItemView {
    #[must_use]
    pub fn new(item: &MediaItem, selection: Option<&MediaSelection>) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            url: item.url.clone(),
            preview_url: item.preview_url().to_string(),
            path: item.storage_path(),
            size: item.human_size(),
            is_image: item.is_image(),
            selected: selection.is_some_and(|s| s.is_selected(&item.url)),
        }
    }

    #[must_use]
    pub fn list(items: &[MediaItem], selection: Option<&MediaSelection>) -> Vec<Self> {
        items.iter().map(|item| Self::new(item, selection)).collect()
    }
}

// =============================================================================
// Catalog & Customers
// =============================================================================

/// Product row for the product list and the POS grid.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: String,
    pub compare_at: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: u32,
    pub in_stock: bool,
}

impl ProductRowView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: currency.format(product.effective_price()),
            compare_at: product.is_on_sale().then(|| currency.format(product.price)),
            category: product.category.clone(),
            image: product.image.clone(),
            stock: product.stock,
            in_stock: product.in_stock(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomerRowView {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&PosCustomer> for CustomerRowView {
    fn from(customer: &PosCustomer) -> Self {
        Self {
            id: customer.id.as_i64(),
            name: customer.name.clone(),
            email: customer.email.as_ref().map(ToString::to_string),
            phone: customer.phone.clone(),
        }
    }
}

// =============================================================================
// POS
// =============================================================================

#[derive(Debug, Clone)]
pub struct PosLineView {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub stock: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl PosLineView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            quantity: item.quantity,
            stock: item.stock,
            unit_price: currency.format(item.effective_price()),
            line_total: currency.format(item.line_total()),
        }
    }
}

/// The register panel: lines, customer and totals.
#[derive(Debug, Clone)]
pub struct PosCartView {
    pub store_slug: String,
    pub lines: Vec<PosLineView>,
    pub item_count: u32,
    pub customer: Option<CustomerRowView>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl PosCartView {
    #[must_use]
    pub fn build(pos: &PosSession, store: &StoreSummary) -> Self {
        let currency = store.currency;
        let summary = pos.summary(&store.charges);
        Self {
            store_slug: store.slug.clone(),
            lines: pos
                .cart()
                .items()
                .iter()
                .map(|item| PosLineView::new(item, currency))
                .collect(),
            item_count: pos.cart().item_count(),
            customer: pos.customer().map(CustomerRowView::from),
            subtotal: currency.format(summary.subtotal),
            shipping: currency.format(summary.shipping),
            tax: currency.format(summary.tax),
            total: currency.format(summary.total),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A one-line message shown above a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
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
    use chrono::{TimeZone, Utc};
    use vitrine_core::{Charge, Charges, CustomerId, MediaId, Money, ProductId, SelectionMode, StoreId};

    use super::*;

    fn store() -> StoreSummary {
        StoreSummary {
            id: StoreId::new(1),
            name: "Tick Tock".to_string(),
            slug: "tick-tock".to_string(),
            currency: CurrencyCode::USD,
            charges: Charges {
                shipping: Charge::Flat(Money::ZERO),
                tax: Charge::Flat(Money::from_major(10)),
            },
        }
    }

    #[test]
    fn test_media_view_marks_selection_and_path() {
        let item = MediaItem {
            id: MediaId::new(5),
            name: "Hero".to_string(),
            file_name: "hero.jpg".to_string(),
            url: "https://cdn.vitrine.test/storage/2/hero.jpg".to_string(),
            thumb_url: None,
            size: 2048,
            mime_type: "image/jpeg".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        };
        let mut selection = MediaSelection::new(SelectionMode::Single);
        selection.toggle(&item.url);

        let view = MediaItemView::new(&item, Some(&selection));
        assert_eq!(view.path, "/storage/2/hero.jpg");
        assert_eq!(view.preview_url, item.url);
        assert_eq!(view.size, "2.0 KB");
        assert!(view.selected);
        assert!(!MediaItemView::new(&item, None).selected);
    }

    #[test]
    fn test_pos_cart_view_totals() {
        let product = Product {
            id: ProductId::new(3),
            slug: "diver".to_string(),
            name: "Diver 300".to_string(),
            price: Money::from_major(100),
            sale_price: Some(Money::from_major(80)),
            stock: 4,
            category: None,
            image: None,
            description: None,
        };
        let mut pos = PosSession::default();
        pos.add(&product, 2).unwrap();
        pos.select_customer(Some(PosCustomer {
            id: CustomerId::new(2),
            name: "Lin".to_string(),
            email: None,
            phone: None,
        }));

        let view = PosCartView::build(&pos, &store());
        assert_eq!(view.subtotal, "$160.00");
        assert_eq!(view.total, "$170.00");
        assert_eq!(view.item_count, 2);
        assert_eq!(view.customer.unwrap().name, "Lin");
        assert_eq!(view.lines.first().unwrap().line_total, "$160.00");
    }
}
