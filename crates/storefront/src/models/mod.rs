//! Session-backed models for the storefront.

pub mod session;

pub use session::{VisitorSession, keys};
