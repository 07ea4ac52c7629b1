//! Opaque identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client's stable identifier, chosen by whoever provisions the client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Create a client id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A token's unique identifier (`jti`), minted fresh for every issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    /// Mint a new random token id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a single tool execution, used to correlate audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Build an execution id from a client, tool name, and start-time millis.
    ///
    /// Mirrors the `{client}:{tool}:{millis}` shape used for correlating
    /// audit entries with their triggering call.
    #[must_use]
    pub fn new(client: &ClientId, tool_name: &str, start_millis: i64) -> Self {
        Self(format!("{client}:{tool_name}:{start_millis}"))
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_round_trips_through_string() {
        let id = ClientId::new("alice");
        assert_eq!(id.as_str(), "alice");
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn token_ids_are_unique() {
        let a = TokenId::generate();
        let b = TokenId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn execution_id_formats_as_expected() {
        let client = ClientId::new("alice");
        let id = ExecutionId::new(&client, "echo", 1700);
        assert_eq!(id.to_string(), "alice:echo:1700");
    }
}
