//! Convenience re-exports for downstream crates.

pub use crate::error::{CoreError, CoreResult};
pub use crate::ids::{ClientId, ExecutionId, TokenId};
pub use crate::time::Timestamp;
