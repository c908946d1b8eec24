//! Point-of-sale register.
//!
//! The register state comes from the injected [`PosStore`]; every mutation
//! loads it once, applies one change and saves it back before rendering the
//! register fragment. Quantities go through the same stock guard as the
//! storefront cart, always clamping. The register follows the store being
//! served: lines rung up in one store never carry over to another.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;
use vitrine_core::{
    CartError, CartItemId, Charges, CurrencyCode, CustomerId, PosSession, ProductId, StoreId,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireOperator};
use crate::models::{CurrentOperator, PosStore};
use crate::platform::StoreSummary;
use crate::state::AppState;
use crate::views::{CustomerRowView, Notice, OperatorView, PosCartView, ProductRowView};

const ADD_FAILED: &str = "Failed to add product";
const STORE_FAILED: &str = "Failed to load store; totals exclude shipping and tax";
const CUSTOMER_FAILED: &str = "Failed to select customer";
const LINE_GONE: &str = "That line is no longer in the register";

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub store: String,
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub store: String,
    pub item_id: CartItemId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub store: String,
    pub item_id: CartItemId,
}

#[derive(Debug, Deserialize)]
pub struct StoreForm {
    pub store: String,
}

/// Empty `customer_id` deselects.
#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    pub store: String,
    #[serde(default)]
    pub customer_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Register screen template.
#[derive(Template, WebTemplate)]
#[template(path = "pos/index.html")]
pub struct PosTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub nonce: String,
    pub store_slug: Option<String>,
    pub store_name: Option<String>,
    pub products: Vec<ProductRowView>,
    pub customers: Vec<CustomerRowView>,
    pub cart: Option<PosCartView>,
    pub notice: Option<Notice>,
}

/// Register panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/pos_cart.html")]
pub struct PosCartTemplate {
    pub cart: PosCartView,
    pub notice: Option<Notice>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Stand-in used when the store can't be loaded: no charges, default currency.
fn unpriced_store(slug: &str) -> StoreSummary {
    StoreSummary {
        id: StoreId::new(0),
        name: slug.to_string(),
        slug: slug.to_string(),
        currency: CurrencyCode::default(),
        charges: Charges::default(),
    }
}

/// The store whose prices and charges the register uses.
async fn register_store(
    state: &AppState,
    operator: &CurrentOperator,
    slug: &str,
) -> (StoreSummary, Option<Notice>) {
    match state.platform().store(&operator.token, slug).await {
        Ok(store) => (store, None),
        Err(e) => {
            tracing::error!(slug = %slug, "Failed to load store for POS: {e}");
            (unpriced_store(slug), Some(Notice::error(STORE_FAILED)))
        }
    }
}

/// Tie the register to `store`, persisting the change when it empties the cart.
async fn bind_register(
    pos_store: &PosStore,
    pos: &mut PosSession,
    store: &StoreSummary,
) -> Result<()> {
    if pos.bind_store(store.id) {
        tracing::debug!(store_id = %store.id, "POS register switched store");
        pos_store.save(pos.clone()).await?;
    }
    Ok(())
}

fn fragment(pos: &PosSession, store: &StoreSummary, notice: Option<Notice>) -> PosCartTemplate {
    PosCartTemplate {
        cart: PosCartView::build(pos, store),
        notice,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Register screen.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store, nonce))]
pub async fn index(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Query(query): Query<StoreQuery>,
    CspNonce(nonce): CspNonce,
) -> Result<PosTemplate> {
    let mut pos = pos_store.load().await?;
    let store_slug = query.store.filter(|s| !s.trim().is_empty());

    let mut template = PosTemplate {
        operator: OperatorView::from(&operator),
        current_path: "/pos".to_string(),
        nonce,
        store_slug: store_slug.clone(),
        store_name: None,
        products: Vec::new(),
        customers: Vec::new(),
        cart: None,
        notice: None,
    };

    let Some(slug) = store_slug else {
        return Ok(template);
    };

    let (store, notice) = register_store(&state, &operator, &slug).await;
    template.notice = notice;

    if template.notice.is_none() {
        bind_register(&pos_store, &mut pos, &store).await?;
        match state.platform().products(&operator.token, store.id).await {
            Ok(products) => {
                template.products = products
                    .iter()
                    .map(|product| ProductRowView::new(product, store.currency))
                    .collect();
            }
            Err(e) => {
                tracing::error!("Failed to fetch products for POS: {e}");
                template.notice = Some(Notice::error("Failed to load products"));
            }
        }
    }

    match state.platform().customers(&operator.token, None).await {
        Ok(customers) => {
            template.customers = customers.iter().map(CustomerRowView::from).collect();
        }
        Err(e) => tracing::error!("Failed to fetch customers for POS: {e}"),
    }

    template.store_name = Some(store.name.clone());
    template.cart = Some(PosCartView::build(&pos, &store));
    Ok(template)
}

/// Ring up a product, incrementing its line if already present.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store))]
pub async fn add(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Form(form): Form<AddForm>,
) -> Result<PosCartTemplate> {
    let mut pos = pos_store.load().await?;
    let (store, notice) = register_store(&state, &operator, &form.store).await;
    if notice.is_some() {
        return Ok(fragment(&pos, &store, Some(Notice::error(ADD_FAILED))));
    }
    bind_register(&pos_store, &mut pos, &store).await?;

    let product = match state.platform().products(&operator.token, store.id).await {
        Ok(products) => products.into_iter().find(|p| p.id == form.product_id),
        Err(e) => {
            tracing::error!("Failed to fetch products for POS add: {e}");
            return Ok(fragment(&pos, &store, Some(Notice::error(ADD_FAILED))));
        }
    };
    let Some(product) = product else {
        return Ok(fragment(&pos, &store, Some(Notice::error("Product not found"))));
    };

    let quantity = form.quantity.unwrap_or(1).max(1);
    let notice = match pos.add(&product, quantity) {
        Ok(line) => {
            let line_quantity = line.quantity.to_string();
            add_breadcrumb(
                "pos",
                "Add product",
                &[("product", product.slug.as_str()), ("quantity", line_quantity.as_str())],
            );
            pos_store.save(pos.clone()).await?;
            None
        }
        Err(CartError::OutOfStock(_)) => {
            Some(Notice::error(format!("{} is out of stock", product.name)))
        }
        Err(e) => {
            tracing::warn!("POS add rejected: {e}");
            Some(Notice::error(ADD_FAILED))
        }
    };

    Ok(fragment(&pos, &store, notice))
}

/// Set a line's quantity, clamped to `[1, stock]`.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store))]
pub async fn update(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Form(form): Form<UpdateForm>,
) -> Result<PosCartTemplate> {
    let mut pos = pos_store.load().await?;
    let (store, mut notice) = register_store(&state, &operator, &form.store).await;
    if notice.is_none() {
        bind_register(&pos_store, &mut pos, &store).await?;
    }

    match pos.set_quantity(form.item_id, form.quantity) {
        Ok(_) => pos_store.save(pos.clone()).await?,
        Err(_) => notice = Some(Notice::error(LINE_GONE)),
    }

    Ok(fragment(&pos, &store, notice))
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store))]
pub async fn remove(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Form(form): Form<RemoveForm>,
) -> Result<PosCartTemplate> {
    let mut pos = pos_store.load().await?;
    let (store, mut notice) = register_store(&state, &operator, &form.store).await;
    if notice.is_none() {
        bind_register(&pos_store, &mut pos, &store).await?;
    }

    match pos.remove(form.item_id) {
        Ok(_) => pos_store.save(pos.clone()).await?,
        Err(_) => notice = Some(Notice::error(LINE_GONE)),
    }

    Ok(fragment(&pos, &store, notice))
}

/// Empty the register. The selected customer stays.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store))]
pub async fn clear(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Form(form): Form<StoreForm>,
) -> Result<PosCartTemplate> {
    let mut pos = pos_store.load().await?;
    let (store, notice) = register_store(&state, &operator, &form.store).await;
    if notice.is_none() {
        bind_register(&pos_store, &mut pos, &store).await?;
    }

    pos.clear_cart();
    pos_store.save(pos.clone()).await?;

    Ok(fragment(&pos, &store, notice))
}

/// Attach a customer to the sale, or detach with an empty `customer_id`.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, pos_store))]
pub async fn select_customer(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    pos_store: PosStore,
    Form(form): Form<CustomerForm>,
) -> Result<PosCartTemplate> {
    let mut pos = pos_store.load().await?;
    let (store, mut notice) = register_store(&state, &operator, &form.store).await;
    if notice.is_none() {
        bind_register(&pos_store, &mut pos, &store).await?;
    }

    let requested = form.customer_id.trim();
    if requested.is_empty() {
        pos.select_customer(None);
        pos_store.save(pos.clone()).await?;
        return Ok(fragment(&pos, &store, notice));
    }

    let Ok(customer_id) = requested.parse::<CustomerId>() else {
        return Ok(fragment(&pos, &store, Some(Notice::error(CUSTOMER_FAILED))));
    };

    match state.platform().customers(&operator.token, None).await {
        Ok(customers) => match customers.into_iter().find(|c| c.id == customer_id) {
            Some(customer) => {
                pos.select_customer(Some(customer));
                pos_store.save(pos.clone()).await?;
            }
            None => notice = Some(Notice::error("Customer not found")),
        },
        Err(e) => {
            tracing::error!("Failed to fetch customers for POS: {e}");
            notice = Some(Notice::error(CUSTOMER_FAILED));
        }
    }

    Ok(fragment(&pos, &store, notice))
}
