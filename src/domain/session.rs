//! Authenticated-session lifecycle state.
//!
//! Exactly one `SessionState` exists per process, owned by the
//! `SessionManager`. Every other component observes it read-only through
//! the manager's watch channel.

use serde::{Deserialize, Serialize};

/// State of the authenticated identity.
///
/// Transitions: Uninitialized → Initializing → {SignedIn, SignedOut},
/// then SignedIn ⇄ SignedOut. `InitError` is terminal until an explicit
/// initialize retry; nothing retries automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SessionState {
    /// Initialize has not been called yet
    Uninitialized,

    /// Identity provider initialization in flight
    Initializing,

    /// Initialized, no active identity
    SignedOut,

    /// Initialized with an active identity
    SignedIn,

    /// Identity provider rejected configuration or failed at init time
    InitError {
        /// Human-readable cause, shown to the user as-is
        cause: String,
    },
}

impl SessionState {
    /// True once an identity is active.
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::SignedIn)
    }

    /// True once initialization has completed into a usable session,
    /// signed in or not. Sign-in attempts before this point are no-ops.
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::SignedIn | SessionState::SignedOut)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::SignedOut => write!(f, "signed out"),
            SessionState::SignedIn => write!(f, "signed in"),
            SessionState::InitError { cause } => write!(f, "init error: {}", cause),
        }
    }
}
