//! Session-backed models for the admin panel.

pub mod pos_store;
pub mod session;

pub use pos_store::PosStore;
pub use session::{CurrentOperator, keys as session_keys};
