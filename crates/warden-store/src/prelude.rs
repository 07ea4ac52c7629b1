//! Convenience re-exports for downstream crates.

pub use crate::error::{StoreError, StoreResult};
pub use crate::store::JsonStore;
