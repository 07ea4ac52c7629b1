//! Common re-exports for embedders building a `warden-server` binary.

pub use crate::assembly::WardenServer;
pub use crate::error::ServerError;
