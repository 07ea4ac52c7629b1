//! Convenience re-exports for downstream crates.

pub use crate::credential::{CredentialRecord, CredentialRegistry};
pub use crate::error::{IdentityError, IdentityResult};
pub use crate::minter::{TokenClaims, TokenKind, TokenMinter, TokenPair};
pub use crate::registry::{TokenRecord, TokenRegistry, TokenSlot};
