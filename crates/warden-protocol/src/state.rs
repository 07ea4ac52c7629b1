//! The per-connection protocol state machine.
//!
//! Every connection starts `Fresh` and must call `initialize` before
//! anything else is accepted. `shutdown` moves it back to `Fresh`, so a
//! connection can be re-initialized rather than needing to reconnect.

use crate::error::ProtocolError;

/// The lifecycle state of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No `initialize` call has completed yet, or `shutdown` has put the
    /// connection back here. Only `initialize` is accepted.
    Fresh,
    /// `initialize` has completed. Any registered method may be called.
    Initialized,
}

/// Tracks a single connection's lifecycle and decides whether an incoming
/// method name is admissible in the current state.
#[derive(Debug)]
pub struct ProtocolStateMachine {
    state: ConnectionState,
}

impl Default for ProtocolStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolStateMachine {
    /// A fresh, uninitialized state machine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Fresh,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check whether `method` may be dispatched in the current state,
    /// without mutating it. Call [`Self::advance`] afterward once the
    /// handler has actually run.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidState`] if `initialize` is called
    /// more than once, or [`ProtocolError::InvalidRequest`] if any method
    /// other than `initialize` is called before initialization.
    pub fn check(&self, method: &str) -> Result<(), ProtocolError> {
        match (self.state, method) {
            (ConnectionState::Fresh, "initialize") => Ok(()),
            (ConnectionState::Fresh, _) => Err(ProtocolError::InvalidRequest(format!(
                "connection must call initialize before {method}"
            ))),
            (ConnectionState::Initialized, "initialize") => Err(ProtocolError::InvalidState(
                "connection is already initialized".to_string(),
            )),
            (ConnectionState::Initialized, _) => Ok(()),
        }
    }

    /// Advance the state machine after a method has been successfully
    /// dispatched. `initialize` moves `Fresh` to `Initialized`; `shutdown`
    /// moves `Initialized` back to `Fresh`. Every other method leaves the
    /// state unchanged.
    pub fn advance(&mut self, method: &str) {
        match (self.state, method) {
            (ConnectionState::Fresh, "initialize") => {
                self.state = ConnectionState::Initialized;
            }
            (ConnectionState::Initialized, "shutdown") => {
                self.state = ConnectionState::Fresh;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fresh_and_only_accepts_initialize() {
        let sm = ProtocolStateMachine::new();
        assert_eq!(sm.state(), ConnectionState::Fresh);
        assert!(sm.check("initialize").is_ok());
        assert!(matches!(
            sm.check("tools/list"),
            Err(ProtocolError::InvalidRequest(_))
        ));
    }

    #[test]
    fn initialize_transitions_to_initialized() {
        let mut sm = ProtocolStateMachine::new();
        sm.check("initialize").unwrap();
        sm.advance("initialize");
        assert_eq!(sm.state(), ConnectionState::Initialized);
        assert!(sm.check("tools/list").is_ok());
    }

    #[test]
    fn double_initialize_is_invalid_state() {
        let mut sm = ProtocolStateMachine::new();
        sm.advance("initialize");
        assert!(matches!(
            sm.check("initialize"),
            Err(ProtocolError::InvalidState(_))
        ));
    }

    #[test]
    fn shutdown_returns_to_fresh_and_requires_reinitialize() {
        let mut sm = ProtocolStateMachine::new();
        sm.advance("initialize");
        sm.advance("shutdown");
        assert_eq!(sm.state(), ConnectionState::Fresh);
        assert!(matches!(
            sm.check("tools/list"),
            Err(ProtocolError::InvalidRequest(_))
        ));
        assert!(sm.check("initialize").is_ok());
    }

    #[test]
    fn shutdown_before_initialize_is_invalid_request_not_invalid_state() {
        let sm = ProtocolStateMachine::new();
        assert!(matches!(
            sm.check("shutdown"),
            Err(ProtocolError::InvalidRequest(_))
        ));
    }
}
