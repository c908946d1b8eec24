//! Typed access to a visitor's session.
//!
//! Cart tokens and coupons are scoped per store tenant, so one visitor can
//! browse several stores without their carts mixing.

use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;
use vitrine_core::{CouponState, StoreId};

/// Session keys for storefront state.
pub mod keys {
    use vitrine_core::StoreId;

    /// Prefix of the per-store cart token key.
    pub const CART_TOKEN_PREFIX: &str = "cart_token";

    /// Prefix of the per-store coupon state key.
    pub const COUPON_PREFIX: &str = "coupon";

    /// Key for the signed-in customer's platform token.
    pub const CUSTOMER_TOKEN: &str = "customer_token";

    /// `cart_token:{store_id}`
    #[must_use]
    pub fn cart_token(store_id: StoreId) -> String {
        format!("{CART_TOKEN_PREFIX}:{store_id}")
    }

    /// `coupon:{store_id}`
    #[must_use]
    pub fn coupon(store_id: StoreId) -> String {
        format!("{COUPON_PREFIX}:{store_id}")
    }
}

/// A visitor's session, read once per request and written after mutations.
#[derive(Clone, Debug)]
pub struct VisitorSession {
    session: Session,
}

impl VisitorSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The platform cart token for `store_id`, if a cart was started.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn cart_token(&self, store_id: StoreId) -> Result<Option<String>, SessionError> {
        self.session.get(&keys::cart_token(store_id)).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_cart_token(&self, store_id: StoreId, token: &str) -> Result<(), SessionError> {
        self.session.insert(&keys::cart_token(store_id), token).await
    }

    /// Drop the cart token and coupon for `store_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn forget_cart(&self, store_id: StoreId) -> Result<(), SessionError> {
        self.session
            .remove::<String>(&keys::cart_token(store_id))
            .await?;
        self.set_coupon(store_id, &CouponState::Idle).await
    }

    /// Coupon state for `store_id`; `Idle` when nothing was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn coupon(&self, store_id: StoreId) -> Result<CouponState, SessionError> {
        Ok(self
            .session
            .get::<CouponState>(&keys::coupon(store_id))
            .await?
            .unwrap_or_default())
    }

    /// Persist coupon state; `Idle` removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_coupon(&self, store_id: StoreId, state: &CouponState) -> Result<(), SessionError> {
        let key = keys::coupon(store_id);
        match state {
            CouponState::Idle => {
                self.session.remove::<CouponState>(&key).await?;
                Ok(())
            }
            CouponState::Applied(_) => self.session.insert(&key, state).await,
        }
    }

    /// The signed-in customer's token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn customer_token(&self) -> Result<Option<String>, SessionError> {
        self.session.get(keys::CUSTOMER_TOKEN).await
    }

    /// Store the token handed over by the platform after sign-in.
    ///
    /// The session ID is cycled first so a pre-login session ID can't be
    /// reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_in(&self, customer_token: &str) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.session.insert(keys::CUSTOMER_TOKEN, customer_token).await
    }

    /// Forget the customer token. Carts stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.session.remove::<String>(keys::CUSTOMER_TOKEN).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;
    use vitrine_core::{CouponValidation, Money};

    use super::*;

    fn visitor() -> VisitorSession {
        VisitorSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[test]
    fn test_keys_are_scoped_per_store() {
        assert_eq!(keys::cart_token(StoreId::new(7)), "cart_token:7");
        assert_eq!(keys::coupon(StoreId::new(7)), "coupon:7");
    }

    #[tokio::test]
    async fn test_cart_tokens_do_not_mix_between_stores() {
        let visitor = visitor();
        visitor.set_cart_token(StoreId::new(1), "tok-a").await.unwrap();

        assert_eq!(
            visitor.cart_token(StoreId::new(1)).await.unwrap().as_deref(),
            Some("tok-a")
        );
        assert_eq!(visitor.cart_token(StoreId::new(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_coupon_round_trip_and_forget() {
        let visitor = visitor();
        let store = StoreId::new(3);
        assert_eq!(visitor.coupon(store).await.unwrap(), CouponState::Idle);

        let mut state = CouponState::Idle;
        state
            .apply_validation(
                "save10",
                CouponValidation {
                    valid: true,
                    discount: Money::from_major(10),
                    message: None,
                },
            )
            .unwrap();
        visitor.set_coupon(store, &state).await.unwrap();
        visitor.set_cart_token(store, "tok").await.unwrap();
        assert_eq!(visitor.coupon(store).await.unwrap(), state);

        visitor.forget_cart(store).await.unwrap();
        assert_eq!(visitor.coupon(store).await.unwrap(), CouponState::Idle);
        assert_eq!(visitor.cart_token(store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let visitor = visitor();
        visitor.sign_in("cust-tok").await.unwrap();
        assert_eq!(
            visitor.customer_token().await.unwrap().as_deref(),
            Some("cust-tok")
        );
        visitor.sign_out().await.unwrap();
        assert_eq!(visitor.customer_token().await.unwrap(), None);
    }
}
