//! Identity subsystem error types.

use thiserror::Error;

/// Errors raised by the credential registry and token subsystem.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// A username was already registered.
    #[error("username already exists: {0}")]
    UsernameTaken(String),

    /// No credential record exists for the given username.
    #[error("unknown username: {0}")]
    UnknownUsername(String),

    /// The account exists but is disabled.
    #[error("account disabled: {0}")]
    AccountDisabled(String),

    /// The supplied password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The signing secret was too short to be used safely.
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    WeakSigningSecret {
        /// Minimum acceptable length.
        min: usize,
        /// Actual length supplied.
        actual: usize,
    },

    /// A token failed signature or expiry verification.
    #[error("token verification failed: {0}")]
    TokenInvalid(String),

    /// A token was presented with the wrong kind (access vs. refresh).
    #[error("expected a {expected} token, got {actual}")]
    WrongTokenKind {
        /// The kind that was required.
        expected: &'static str,
        /// The kind the token actually carried.
        actual: &'static str,
    },

    /// The token's `jti` is not known to the registry.
    #[error("token not found: {0}")]
    TokenNotFound(String),

    /// The token's `jti` has been revoked.
    #[error("token revoked: {0}")]
    TokenRevoked(String),

    /// A hashing or storage failure occurred.
    #[error(transparent)]
    Crypto(#[from] warden_crypto::CryptoError),

    /// A storage failure occurred.
    #[error(transparent)]
    Store(#[from] warden_store::StoreError),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
