//! Cache types for platform API responses.

use std::sync::Arc;

use vitrine_core::{Product, StoreId};

use super::types::StoreProfile;

/// Cache key for store profiles and catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Store(String),
    Products(StoreId),
    Product(StoreId, String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Store(Arc<StoreProfile>),
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
}
