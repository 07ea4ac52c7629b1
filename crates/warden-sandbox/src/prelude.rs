//! Convenience re-exports for downstream crates.

pub use crate::error::{SandboxError, SandboxResult};
pub use crate::jail::JailManager;
pub use crate::quota::{Quota, QuotaManager, ResourceRequirement};
pub use crate::state::SandboxStateStore;
