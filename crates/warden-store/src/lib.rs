//! Durable JSON-backed storage with atomic writes.
//!
//! Every write in this crate follows the same discipline: serialize to a
//! sibling temp file in the target's directory, flush and fsync it, then
//! rename it over the target. A reader never observes a half-written file.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), warden_store::StoreError> {
//! use warden_store::JsonStore;
//! use serde_json::json;
//!
//! let store: JsonStore<serde_json::Value> = JsonStore::new("/tmp/warden/clients.json", json!({}));
//! let mut value = store.load().await?;
//! value["hello"] = json!("world");
//! store.save(&value).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod prelude;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::JsonStore;
