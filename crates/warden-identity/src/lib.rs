//! Credential storage and token issuance/revocation.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), warden_identity::IdentityError> {
//! use warden_identity::{CredentialRegistry, TokenMinter, TokenRegistry};
//!
//! let credentials = CredentialRegistry::new("/tmp/warden/clients.json");
//! credentials.create("alice", "hunter2", None, None, None).await?;
//! let record = credentials.authenticate("alice", "hunter2").await?;
//!
//! let minter = TokenMinter::new(b"a signing secret of at least 32 bytes!!".to_vec())?;
//! let registry = TokenRegistry::new("/tmp/warden/tokens.json");
//! let pair = minter.mint_pair(&record)?;
//! registry.record(&pair, &record.id, &record.username).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod credential;
pub mod error;
pub mod minter;
pub mod prelude;
pub mod registry;

pub use credential::{CredentialRecord, CredentialRegistry};
pub use error::{IdentityError, IdentityResult};
pub use minter::{TokenClaims, TokenKind, TokenMinter, TokenPair};
pub use registry::{TokenRecord, TokenRegistry, TokenSlot};
