//! Cryptographic primitives used by the identity, audit, and store crates.
//!
//! # Example
//!
//! ```
//! use warden_crypto::ContentHash;
//!
//! let hash = ContentHash::hash(b"hello world");
//! assert_eq!(hash, ContentHash::hash(b"hello world"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod hash;
pub mod keypair;
pub mod password;
pub mod prelude;

pub use error::{CryptoError, CryptoResult};
pub use hash::ContentHash;
pub use keypair::KeyPair;
pub use password::{hash_password, verify_password};
