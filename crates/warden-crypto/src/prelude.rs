//! Convenience re-exports for downstream crates.

pub use crate::error::{CryptoError, CryptoResult};
pub use crate::hash::ContentHash;
pub use crate::keypair::KeyPair;
pub use crate::password::{hash_password, verify_password};
