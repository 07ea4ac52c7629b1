//! Shared primitive types used across the Warden server crates.
//!
//! # Example
//!
//! ```
//! use warden_core::{ClientId, Timestamp};
//!
//! let client = ClientId::new("alice-laptop");
//! let now = Timestamp::now();
//! assert_eq!(client.as_str(), "alice-laptop");
//! assert!(now.as_unix_millis() > 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod ids;
pub mod prelude;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use ids::{ClientId, ExecutionId, TokenId};
pub use time::Timestamp;
