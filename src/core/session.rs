//! Session lifecycle management.
//!
//! The `SessionManager` owns the single process-wide [`SessionState`]
//! and is the only component that mutates it. Every transition is
//! broadcast on a watch channel; the feed assembler is one subscriber,
//! the presentation layer another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapters::IdentityProvider;
use crate::domain::session::SessionState;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity provider initialization failed. Terminal until the
    /// caller explicitly retries `initialize`.
    #[error("identity provider initialization failed: {0}")]
    Init(String),

    /// Sign-in or sign-out failed. Recoverable; the session stays in
    /// its previous state and the user may retry.
    #[error("{0}")]
    Action(String),
}

/// Owner of the authenticated-identity lifecycle.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    state_tx: watch::Sender<SessionState>,
    /// Set once a successful initialize has wired the provider; keeps
    /// `initialize` idempotent and the broadcast wiring single.
    initialized: AtomicBool,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Uninitialized);
        Self {
            provider,
            state_tx,
            initialized: AtomicBool::new(false),
        }
    }

    /// Subscribe to state transitions. The receiver always starts with
    /// the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Initialize the identity provider. Idempotent: repeat calls after
    /// a successful initialize are no-ops. A failed initialize lands in
    /// `InitError` and stays there until this is called again.
    pub async fn initialize(&self) -> Result<(), AuthError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.transition(SessionState::Initializing);

        match self.provider.initialize().await {
            Ok(restored_signed_in) => {
                if restored_signed_in {
                    self.transition(SessionState::SignedIn);
                } else {
                    self.transition(SessionState::SignedOut);
                }
                Ok(())
            }
            Err(e) => {
                // Allow an explicit retry to run initialize again.
                self.initialized.store(false, Ordering::SeqCst);
                let cause = e.to_string();
                self.transition(SessionState::InitError {
                    cause: cause.clone(),
                });
                Err(AuthError::Init(cause))
            }
        }
    }

    /// Run the provider's interactive sign-in flow. A no-op unless
    /// initialization has completed; a provider error or user
    /// cancellation is non-fatal and leaves the session signed out.
    pub async fn sign_in(&self) -> Result<(), AuthError> {
        match self.state() {
            SessionState::SignedIn => return Ok(()),
            SessionState::SignedOut => {}
            other => {
                warn!(state = %other, "sign-in requested before initialization completed");
                return Ok(());
            }
        }

        match self.provider.sign_in().await {
            Ok(()) => {
                self.transition(SessionState::SignedIn);
                Ok(())
            }
            Err(e) => Err(AuthError::Action(e.to_string())),
        }
    }

    /// Sign out with the provider. Observers of the SignedIn→SignedOut
    /// transition are obliged to clear feed, search and playback state.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if !self.state().is_signed_in() {
            return Ok(());
        }

        match self.provider.sign_out().await {
            Ok(()) => {
                self.transition(SessionState::SignedOut);
                Ok(())
            }
            Err(e) => Err(AuthError::Action(e.to_string())),
        }
    }

    fn transition(&self, next: SessionState) {
        info!(state = %next, "session transition");
        self.state_tx.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{IdentityError, IdentityProvider};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Scriptable provider double.
    struct StubProvider {
        init_result: fn() -> Result<bool, IdentityError>,
        sign_in_result: fn() -> Result<(), IdentityError>,
        init_calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(
            init_result: fn() -> Result<bool, IdentityError>,
            sign_in_result: fn() -> Result<(), IdentityError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                init_result,
                sign_in_result,
                init_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn initialize(&self) -> Result<bool, IdentityError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            (self.init_result)()
        }

        async fn sign_in(&self) -> Result<(), IdentityError> {
            (self.sign_in_result)()
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_initialize_lands_signed_out() {
        let manager = SessionManager::new(StubProvider::new(|| Ok(false), || Ok(())));
        manager.initialize().await.unwrap();
        assert_eq!(manager.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_initialize_restores_signed_in() {
        let manager = SessionManager::new(StubProvider::new(|| Ok(true), || Ok(())));
        manager.initialize().await.unwrap();
        assert_eq!(manager.state(), SessionState::SignedIn);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let provider = StubProvider::new(|| Ok(false), || Ok(()));
        let manager = SessionManager::new(provider.clone());

        manager.initialize().await.unwrap();
        manager.initialize().await.unwrap();

        assert_eq!(provider.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_lands_in_init_error_and_allows_retry() {
        let provider = StubProvider::new(
            || Err(IdentityError::Init("bad client id".to_string())),
            || Ok(()),
        );
        let manager = SessionManager::new(provider.clone());

        assert!(manager.initialize().await.is_err());
        match manager.state() {
            SessionState::InitError { cause } => assert!(cause.contains("bad client id")),
            other => panic!("expected InitError, got {:?}", other),
        }

        // Explicit retry reaches the provider again.
        assert!(manager.initialize().await.is_err());
        assert_eq!(provider.init_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sign_in_before_initialize_is_a_no_op() {
        let provider = StubProvider::new(|| Ok(false), || Ok(()));
        let manager = SessionManager::new(provider.clone());

        manager.sign_in().await.unwrap();
        assert_eq!(manager.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_sign_in_failure_stays_signed_out() {
        let manager = SessionManager::new(StubProvider::new(
            || Ok(false),
            || Err(IdentityError::SignIn("user closed the prompt".to_string())),
        ));

        manager.initialize().await.unwrap();
        assert!(manager.sign_in().await.is_err());
        assert_eq!(manager.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_full_cycle_and_broadcast() {
        let manager = SessionManager::new(StubProvider::new(|| Ok(false), || Ok(())));
        let mut rx = manager.subscribe();

        manager.initialize().await.unwrap();
        manager.sign_in().await.unwrap();
        manager.sign_out().await.unwrap();

        // The receiver observes the latest state.
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_out_when_already_signed_out_is_a_no_op() {
        let manager = SessionManager::new(StubProvider::new(|| Ok(false), || Ok(())));
        manager.initialize().await.unwrap();
        manager.sign_out().await.unwrap();
        assert_eq!(manager.state(), SessionState::SignedOut);
    }
}
