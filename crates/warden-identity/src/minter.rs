//! Signs and verifies access/refresh token pairs.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use warden_core::TokenId;

use crate::credential::CredentialRecord;
use crate::error::IdentityError;

const MIN_SECRET_LEN: usize = 32;

/// Whether a token is a short-lived access token or a long-lived refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Presented on every authenticated call; short lifetime.
    Access,
    /// Presented only to `auth/refresh`; long lifetime.
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims embedded in a minted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the credential record's stable id.
    pub sub: String,
    /// Username, carried for convenience so callers need not look it up.
    pub username: String,
    /// Unique token id, independent per mint, used for revocation.
    pub jti: String,
    /// Roles held at mint time.
    pub roles: Vec<String>,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// `"access"` or `"refresh"`.
    pub token_type: String,
}

/// An access/refresh token pair returned from a successful mint.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// The jti shared by both tokens in the pair.
    pub jti: TokenId,
    /// Encoded access token.
    pub access_token: String,
    /// Encoded refresh token.
    pub refresh_token: String,
    /// Access token claims (for computing `expires_in` etc).
    pub access_claims: TokenClaims,
    /// Refresh token claims.
    pub refresh_claims: TokenClaims,
}

/// Signs and verifies token pairs with a shared HMAC secret.
pub struct TokenMinter {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenMinter {
    /// Default access token lifetime: 60 minutes.
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
    /// Default refresh token lifetime: 7 days.
    pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

    /// Build a minter from a raw signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::WeakSigningSecret`] if `secret` is shorter than 32 bytes.
    pub fn new(secret: Vec<u8>) -> Result<Self, IdentityError> {
        Self::with_ttls(secret, Self::DEFAULT_ACCESS_TTL_SECS, Self::DEFAULT_REFRESH_TTL_SECS)
    }

    /// Build a minter with explicit token lifetimes.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::WeakSigningSecret`] if `secret` is shorter than 32 bytes.
    pub fn with_ttls(
        secret: Vec<u8>,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<Self, IdentityError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(IdentityError::WeakSigningSecret {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    /// Mint a fresh access/refresh pair for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::TokenInvalid`] if signing fails.
    pub fn mint_pair(&self, record: &CredentialRecord) -> Result<TokenPair, IdentityError> {
        let jti = TokenId::generate();
        let now = chrono::Utc::now().timestamp();

        let access_claims = TokenClaims {
            sub: record.id.clone(),
            username: record.username.clone(),
            jti: jti.to_string(),
            roles: record.roles.clone(),
            iat: now,
            exp: now + self.access_ttl_secs,
            token_type: TokenKind::Access.as_str().to_string(),
        };
        let refresh_claims = TokenClaims {
            exp: now + self.refresh_ttl_secs,
            token_type: TokenKind::Refresh.as_str().to_string(),
            ..access_claims.clone()
        };

        let access_token = self.encode(&access_claims)?;
        let refresh_token = self.encode(&refresh_claims)?;

        Ok(TokenPair {
            jti,
            access_token,
            refresh_token,
            access_claims,
            refresh_claims,
        })
    }

    /// Mint a fresh access token sharing `previous`'s identity, used by
    /// `auth/refresh`. The new token gets its own `jti`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::TokenInvalid`] if signing fails.
    pub fn mint_access_only(
        &self,
        owner_id: &str,
        username: &str,
        roles: Vec<String>,
    ) -> Result<(TokenId, String, TokenClaims), IdentityError> {
        let jti = TokenId::generate();
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            sub: owner_id.to_string(),
            username: username.to_string(),
            jti: jti.to_string(),
            roles,
            iat: now,
            exp: now + self.access_ttl_secs,
            token_type: TokenKind::Access.as_str().to_string(),
        };
        let token = self.encode(&claims)?;
        Ok((jti, token, claims))
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String, IdentityError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| IdentityError::TokenInvalid(e.to_string()))
    }

    /// Verify `token`'s signature and expiry, and that it carries `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::TokenInvalid`] on a bad signature or expired
    /// token, or [`IdentityError::WrongTokenKind`] if `token` is of the other kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, IdentityError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| IdentityError::TokenInvalid(e.to_string()))?;
        let claims = data.claims;
        if claims.token_type != kind.as_str() {
            return Err(IdentityError::WrongTokenKind {
                expected: kind.as_str(),
                actual: if claims.token_type == TokenKind::Access.as_str() {
                    "access"
                } else {
                    "refresh"
                },
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use warden_core::Timestamp;

    fn secret() -> Vec<u8> {
        b"a signing secret of at least 32 bytes!!".to_vec()
    }

    fn sample_record() -> CredentialRecord {
        CredentialRecord {
            id: "user-1".to_string(),
            username: "alice".to_string(),
            password_hash: String::new(),
            email: None,
            roles: vec!["user".to_string()],
            created_at: Timestamp::now(),
            last_login: None,
            enabled: true,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn rejects_weak_secret() {
        let err = TokenMinter::new(vec![0u8; 8]).unwrap_err();
        assert!(matches!(err, IdentityError::WeakSigningSecret { .. }));
    }

    #[test]
    fn mint_and_verify_round_trips() {
        let minter = TokenMinter::new(secret()).unwrap();
        let pair = minter.mint_pair(&sample_record()).unwrap();

        let access = minter.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.username, "alice");

        let refresh = minter
            .verify(&pair.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(refresh.jti, pair.jti.to_string());
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let minter = TokenMinter::new(secret()).unwrap();
        let pair = minter.mint_pair(&sample_record()).unwrap();
        let err = minter
            .verify(&pair.access_token, TokenKind::Refresh)
            .unwrap_err();
        assert!(matches!(err, IdentityError::WrongTokenKind { .. }));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let minter = TokenMinter::new(secret()).unwrap();
        let pair = minter.mint_pair(&sample_record()).unwrap();
        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert!(minter.verify(&tampered, TokenKind::Access).is_err());
    }
}
