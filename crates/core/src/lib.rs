//! Vitrine Core - Shared domain library.
//!
//! This crate provides the domain types and rules used by both frontends:
//! - `storefront` - Public, themeable shop pages per store tenant
//! - `admin` - Internal dashboard (media library, POS, catalog lists)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. Every cart, coupon and pricing decision is made
//! here so both binaries compute summaries the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, fixed-point money, email addresses
//! - [`catalog`] - Products as served by the platform API
//! - [`cart`] - Cart line items and the quantity/stock guard
//! - [`pricing`] - Cart summary calculation
//! - [`coupon`] - Applied-coupon state machine
//! - [`theme`] - Store themes and their presentation config
//! - [`media`] - Media library items, upload merging and path normalization
//! - [`pos`] - Point-of-sale cart and selected customer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod media;
pub mod pos;
pub mod pricing;
pub mod theme;
pub mod types;

pub use cart::{Cart, CartError, CartItem, QuantityChange, QuantityPolicy};
pub use catalog::Product;
pub use coupon::{AppliedCoupon, CouponAction, CouponError, CouponState, CouponValidation};
pub use media::{MediaItem, MediaSelection, SelectionMode, UploadBatch};
pub use pos::{PosCustomer, PosSession};
pub use pricing::{CartSummary, Charge, Charges};
pub use theme::{StoreTheme, ThemeConfig, ThemeSelection};
pub use types::*;
