//! Session-backed store for the point-of-sale register.
//!
//! The register's store, cart and selected customer live under
//! [`STORE_KEY`], [`CART_KEY`] and [`CUSTOMER_KEY`]. [`PosStore::init`] runs when an operator
//! signs in and [`PosStore::clear`] when they sign out; in between, handlers
//! [`load`](PosStore::load) the state once, mutate it and
//! [`save`](PosStore::save) it back.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;
use vitrine_core::pos::{CART_KEY, CUSTOMER_KEY, STORE_KEY};
use vitrine_core::{Cart, PosCustomer, PosSession, StoreId};

/// Handle to the POS state of the current session.
#[derive(Clone, Debug)]
pub struct PosStore {
    session: Session,
}

impl PosStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Start an empty register.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn init(&self) -> Result<(), SessionError> {
        self.save(PosSession::default()).await
    }

    /// Read the register state.
    ///
    /// Unreadable entries (left over from an older format) are treated as
    /// empty and logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(&self) -> Result<PosSession, SessionError> {
        let store = match self.session.get::<StoreId>(STORE_KEY).await {
            Ok(store) => store,
            Err(SessionError::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable POS store");
                None
            }
            Err(e) => return Err(e),
        };

        let cart = match self.session.get::<Cart>(CART_KEY).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(SessionError::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable POS cart");
                Cart::default()
            }
            Err(e) => return Err(e),
        };

        let customer = match self.session.get::<PosCustomer>(CUSTOMER_KEY).await {
            Ok(customer) => customer,
            Err(SessionError::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable POS customer");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(PosSession::restore(store, cart, customer))
    }

    /// Write the register state back.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, pos: PosSession) -> Result<(), SessionError> {
        let (store, cart, customer) = pos.into_parts();
        match store {
            Some(store) => self.session.insert(STORE_KEY, store).await?,
            None => {
                self.session.remove::<StoreId>(STORE_KEY).await?;
            }
        }
        self.session.insert(CART_KEY, cart).await?;
        match customer {
            Some(customer) => self.session.insert(CUSTOMER_KEY, customer).await,
            None => {
                self.session.remove::<PosCustomer>(CUSTOMER_KEY).await?;
                Ok(())
            }
        }
    }

    /// Drop the register state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.session.remove::<StoreId>(STORE_KEY).await?;
        self.session.remove::<Cart>(CART_KEY).await?;
        self.session.remove::<PosCustomer>(CUSTOMER_KEY).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for PosStore
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;
    use vitrine_core::{CustomerId, Money, Product, ProductId};

    use super::*;

    fn store() -> (PosStore, Session) {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        (PosStore::new(session.clone()), session)
    }

    fn product() -> Product {
        Product {
            id: ProductId::new(30),
            slug: "chrono-steel".to_string(),
            name: "Chrono Steel".to_string(),
            price: Money::from_major(250),
            sale_price: None,
            stock: 3,
            category: Some("Watches".to_string()),
            image: None,
            description: None,
        }
    }

    fn customer() -> PosCustomer {
        PosCustomer {
            id: CustomerId::new(8),
            name: "Grace Hopper".to_string(),
            email: None,
            phone: Some("555-0100".to_string()),
        }
    }

    #[tokio::test]
    async fn test_load_from_fresh_session_is_empty() {
        let (store, _) = store();
        assert_eq!(store.load().await.unwrap(), PosSession::default());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_cart_and_customer() {
        let (store, _) = store();
        let mut pos = store.load().await.unwrap();
        pos.bind_store(StoreId::new(1));
        pos.add(&product(), 2).unwrap();
        pos.select_customer(Some(customer()));
        store.save(pos.clone()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), pos);
    }

    #[tokio::test]
    async fn test_deselecting_customer_removes_key() {
        let (store, session) = store();
        let mut pos = PosSession::default();
        pos.select_customer(Some(customer()));
        store.save(pos.clone()).await.unwrap();

        pos.select_customer(None);
        store.save(pos).await.unwrap();
        assert!(
            session
                .get::<PosCustomer>(CUSTOMER_KEY)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_clear_drops_every_key() {
        let (store, session) = store();
        let mut pos = PosSession::default();
        pos.bind_store(StoreId::new(1));
        pos.add(&product(), 1).unwrap();
        pos.select_customer(Some(customer()));
        store.save(pos).await.unwrap();

        store.clear().await.unwrap();
        assert!(session.get::<Cart>(CART_KEY).await.unwrap().is_none());
        assert!(session.get::<StoreId>(STORE_KEY).await.unwrap().is_none());
        assert_eq!(store.load().await.unwrap(), PosSession::default());
    }

    #[tokio::test]
    async fn test_unreadable_cart_is_discarded() {
        let (store, session) = store();
        session.insert(CART_KEY, "not a cart").await.unwrap();
        assert!(store.load().await.unwrap().cart().is_empty());
    }
}
