//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives on the platform; the session only holds the cart
//! token and the applied coupon for each store.
//!
//! Upstream failures never fail a fragment request: the fragment re-renders
//! with a generic message and whatever cart state was last known.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use vitrine_core::{
    Cart, CartError, CartItemId, CouponAction, CouponState, ProductId, QuantityChange,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::platform::{CartResource, PlatformError, StoreProfile};
use crate::routes::load_store;
use crate::state::AppState;
use crate::views::{CartView, Notice, StoreView};

const ADD_FAILED: &str = "Failed to add to cart. Please try again.";
const UPDATE_FAILED: &str = "Failed to update your cart. Please try again.";
const LOAD_FAILED: &str = "Failed to load your cart. Please try again.";
const COUPON_FAILED: &str = "Could not check that coupon. Please try again.";
const ITEM_GONE: &str = "That item is no longer in your cart.";

/// HTMX event fired whenever the cart's lines change.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity form data. The quantity may be zero or negative; the
/// theme's policy decides what that means.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartPageTemplate {
    pub store: StoreView,
    pub cart: CartView,
    pub notice: Option<Notice>,
    pub nonce: String,
}

/// Cart contents fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_contents.html")]
pub struct CartContentsTemplate {
    pub store: StoreView,
    pub cart: CartView,
    pub notice: Option<Notice>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Request Context
// =============================================================================

/// Per-request cart context: the store, its theme and the visitor session.
struct CartContext {
    store: Arc<StoreProfile>,
    view: StoreView,
    visitor: VisitorSession,
    token: Option<String>,
}

impl CartContext {
    async fn load(state: &AppState, store_slug: &str, session: Session) -> Result<Self> {
        let store = load_store(state, store_slug).await?;
        let visitor = VisitorSession::new(session);
        let token = visitor.cart_token(store.id).await?;
        Ok(Self {
            view: StoreView::from(store.as_ref()),
            store,
            visitor,
            token,
        })
    }

    /// The visitor's cart. A missing token is an empty cart; an expired one
    /// is forgotten.
    async fn current_cart(&self, state: &AppState) -> std::result::Result<Cart, PlatformError> {
        let Some(token) = self.token.as_deref() else {
            return Ok(Cart::default());
        };

        match state.platform().cart(self.store.id, token).await {
            Ok(resource) => Ok(resource.into_cart()),
            Err(e) if e.is_not_found() => {
                tracing::info!(store_id = %self.store.id, "Cart expired, starting over");
                if let Err(e) = self.visitor.forget_cart(self.store.id).await {
                    tracing::warn!("Failed to forget expired cart: {e}");
                }
                Ok(Cart::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn coupon(&self) -> CouponState {
        self.visitor
            .coupon(self.store.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read coupon from session: {e}");
                CouponState::Idle
            })
    }

    async fn save_coupon(&self, coupon: &CouponState) {
        if let Err(e) = self.visitor.set_coupon(self.store.id, coupon).await {
            tracing::error!("Failed to save coupon to session: {e}");
        }
    }

    /// Remember the token of a cart the platform just returned.
    async fn remember(&self, resource: &CartResource) {
        if self.token.as_deref() == Some(resource.token.as_str()) {
            return;
        }
        if let Err(e) = self
            .visitor
            .set_cart_token(self.store.id, &resource.token)
            .await
        {
            tracing::error!("Failed to save cart token to session: {e}");
        }
    }

    fn cart_view(&self, cart: &Cart, coupon: &CouponState) -> CartView {
        CartView::build(cart, coupon, &self.store.charges, self.view.currency)
    }

    async fn contents(&self, cart: &Cart, notice: Option<Notice>) -> CartContentsTemplate {
        let coupon = self.coupon().await;
        CartContentsTemplate {
            store: self.view.clone(),
            cart: self.cart_view(cart, &coupon),
            notice,
        }
    }
}

/// Attach the `cart-updated` trigger to a fragment.
fn updated(fragment: impl IntoResponse) -> Response {
    (AppendHeaders([CART_UPDATED]), fragment).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<CartPageTemplate> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;

    let (cart, notice) = match ctx.current_cart(&state).await {
        Ok(cart) => (cart, None),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            (Cart::default(), Some(Notice::error(LOAD_FAILED)))
        }
    };

    let coupon = ctx.coupon().await;
    Ok(CartPageTemplate {
        cart: ctx.cart_view(&cart, &coupon),
        store: ctx.view,
        notice,
        nonce,
    })
}

/// Add a product to the cart (HTMX).
///
/// Creates a cart on first use, or when the stored one has expired. Returns
/// the count badge with a `cart-updated` trigger.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;
    let platform = state.platform();
    let quantity = form.quantity.unwrap_or(1).max(1);

    let result = match ctx.token.as_deref() {
        Some(token) => match platform
            .add_item(ctx.store.id, token, form.product_id, quantity)
            .await
        {
            Err(e) if e.is_not_found() => {
                platform
                    .create_cart(ctx.store.id, form.product_id, quantity)
                    .await
            }
            other => other,
        },
        None => {
            platform
                .create_cart(ctx.store.id, form.product_id, quantity)
                .await
        }
    };

    match result {
        Ok(resource) => {
            ctx.remember(&resource).await;
            add_breadcrumb(
                "cart",
                "Added to cart",
                &[("product_id", form.product_id.to_string().as_str())],
            );
            let count = resource.into_cart().item_count();
            Ok(updated(CartCountTemplate { count }))
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            Ok(Html(format!("<span class=\"cart-error\" role=\"alert\">{ADD_FAILED}</span>"))
                .into_response())
        }
    }
}

/// Change a line's quantity (HTMX).
///
/// The requested quantity goes through the quantity guard with the theme's
/// policy: it is capped at stock, and below one either clamps to one or
/// removes the line.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;

    let cart = match ctx.current_cart(&state).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to fetch cart for update: {e}");
            let fragment = ctx
                .contents(&Cart::default(), Some(Notice::error(LOAD_FAILED)))
                .await;
            return Ok(fragment.into_response());
        }
    };

    let mut guarded = cart.clone();
    let policy = ctx.view.theme.quantity_policy;
    let change = match guarded.set_quantity(form.item_id, form.quantity, policy) {
        Ok(change) => change,
        Err(CartError::ItemNotFound(_) | CartError::OutOfStock(_)) => {
            let fragment = ctx.contents(&cart, Some(Notice::error(ITEM_GONE))).await;
            return Ok(fragment.into_response());
        }
    };

    let Some(token) = ctx.token.as_deref() else {
        return Ok(ctx.contents(&cart, None).await.into_response());
    };

    let platform = state.platform();
    let result = match change {
        QuantityChange::Set(quantity) => {
            platform
                .update_item(ctx.store.id, token, form.item_id, quantity)
                .await
        }
        QuantityChange::Remove => platform.remove_item(ctx.store.id, token, form.item_id).await,
    };

    match result {
        Ok(resource) => Ok(updated(ctx.contents(&resource.into_cart(), None).await)),
        Err(e) => {
            tracing::error!("Failed to update cart: {e}");
            let fragment = ctx.contents(&cart, Some(Notice::error(UPDATE_FAILED))).await;
            Ok(fragment.into_response())
        }
    }
}

/// Remove a line from the cart (HTMX).
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;

    let Some(token) = ctx.token.as_deref() else {
        return Ok(ctx.contents(&Cart::default(), None).await.into_response());
    };

    match state
        .platform()
        .remove_item(ctx.store.id, token, form.item_id)
        .await
    {
        Ok(resource) => Ok(updated(ctx.contents(&resource.into_cart(), None).await)),
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            let cart = ctx.current_cart(&state).await.unwrap_or_default();
            let fragment = ctx.contents(&cart, Some(Notice::error(UPDATE_FAILED))).await;
            Ok(fragment.into_response())
        }
    }
}

/// Empty the cart (HTMX). The applied coupon goes with it.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
) -> Result<Response> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;

    let Some(token) = ctx.token.as_deref() else {
        return Ok(ctx.contents(&Cart::default(), None).await.into_response());
    };

    match state.platform().clear_cart(ctx.store.id, token).await {
        Ok(resource) => {
            ctx.save_coupon(&CouponState::Idle).await;
            Ok(updated(ctx.contents(&resource.into_cart(), None).await))
        }
        Err(e) => {
            tracing::error!("Failed to clear cart: {e}");
            let cart = ctx.current_cart(&state).await.unwrap_or_default();
            let fragment = ctx.contents(&cart, Some(Notice::error(UPDATE_FAILED))).await;
            Ok(fragment.into_response())
        }
    }
}

/// Cart count badge (HTMX). Shows zero when the cart can't be loaded.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
) -> Result<CartCountTemplate> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;
    let count = ctx
        .current_cart(&state)
        .await
        .map(|cart| cart.item_count())
        .unwrap_or(0);
    Ok(CartCountTemplate { count })
}

/// Apply, replace or toggle off a coupon (HTMX).
///
/// Submitting the applied code removes it without asking the platform. Any
/// other code is validated; the platform's message for a rejected code is
/// shown as is. Transport failures leave the applied coupon untouched.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(state, session))]
pub async fn coupon(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Result<Response> {
    let ctx = CartContext::load(&state, &store_slug, session).await?;

    let cart = match ctx.current_cart(&state).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!("Failed to fetch cart for coupon: {e}");
            let fragment = ctx
                .contents(&Cart::default(), Some(Notice::error(LOAD_FAILED)))
                .await;
            return Ok(fragment.into_response());
        }
    };

    let mut coupon = ctx.coupon().await;
    let notice = match coupon.plan(&form.code) {
        Err(e) => Notice::error(e.to_string()),
        Ok(CouponAction::Remove) => {
            coupon.remove();
            ctx.save_coupon(&coupon).await;
            Notice::info("Coupon removed")
        }
        Ok(CouponAction::Validate(code)) => {
            match state.platform().validate_coupon(ctx.store.id, &code).await {
                Ok(validation) => {
                    let message = validation.message.clone();
                    let notice = match coupon.apply_validation(&code, validation) {
                        Ok(applied) => Notice::info(
                            message.unwrap_or_else(|| format!("Coupon {} applied", applied.code)),
                        ),
                        Err(rejected) => Notice::error(rejected.to_string()),
                    };
                    ctx.save_coupon(&coupon).await;
                    notice
                }
                Err(e) => {
                    tracing::warn!("Coupon validation failed: {e}");
                    Notice::error(COUPON_FAILED)
                }
            }
        }
    };

    let fragment = CartContentsTemplate {
        store: ctx.view.clone(),
        cart: ctx.cart_view(&cart, &coupon),
        notice: Some(notice),
    };
    Ok(fragment.into_response())
}
