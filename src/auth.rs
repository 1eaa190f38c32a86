//! Shared sign-in state and the session gate
//!
//! One [`AuthContext`] per process holds the signed-in identity. Hosts update
//! it when their identity provider reports a change, and every screen or task
//! that cares reads it through a `watch` subscription instead of talking to
//! the provider itself.
//!
//! The quiz engine never looks at identities. [`SessionGate`] is the single
//! yes/no check a host makes before it builds a session.

use log::debug;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::error::QuizError;

static GLOBAL_CONTEXT: OnceCell<AuthContext> = OnceCell::new();

/// "May this caller start a session?"
pub trait SessionGate {
    fn is_authorized(&self) -> bool;
}

/// A gate that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

impl SessionGate for StaticGate {
    fn is_authorized(&self) -> bool {
        self.0
    }
}

/// A signed-in user, as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

#[derive(Debug)]
pub struct AuthContext {
    identity: watch::Sender<Option<Identity>>,
    closed: AtomicBool,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity,
            closed: AtomicBool::new(false),
        }
    }

    /// The process-wide context, created on first use.
    pub fn global() -> &'static AuthContext {
        GLOBAL_CONTEXT.get_or_init(AuthContext::new)
    }

    /// Record a sign-in.
    ///
    /// # Errors
    /// - [`QuizError::Unauthorized`] after [`teardown`](Self::teardown)
    pub fn sign_in(&self, identity: Identity) -> Result<(), QuizError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QuizError::Unauthorized);
        }
        debug!("signed in: {}", identity.user_id);
        self.identity.send_replace(Some(identity));
        Ok(())
    }

    pub fn sign_out(&self) {
        if self.identity.send_replace(None).is_some() {
            debug!("signed out");
        }
    }

    /// Sign out and refuse further sign-ins. Subscribers see `None`.
    pub fn teardown(&self) {
        self.closed.store(true, Ordering::Release);
        self.identity.send_replace(None);
    }

    pub fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// Read-only view of identity changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}

impl SessionGate for AuthContext {
    fn is_authorized(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && self.identity.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let auth = AuthContext::new();
        assert!(!auth.is_authorized());

        auth.sign_in(Identity::new("u1").with_display_name("Ada")).unwrap();
        assert!(auth.is_authorized());
        assert_eq!(auth.current().unwrap().display_name.as_deref(), Some("Ada"));

        auth.sign_out();
        assert!(!auth.is_authorized());
        assert!(auth.current().is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let auth = AuthContext::new();
        let mut rx = auth.subscribe();
        assert!(rx.borrow_and_update().is_none());

        auth.sign_in(Identity::new("u2")).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().user_id, "u2");
    }

    #[test]
    fn test_teardown_rejects_sign_in() {
        let auth = AuthContext::new();
        auth.sign_in(Identity::new("u3")).unwrap();
        auth.teardown();

        assert!(!auth.is_authorized());
        assert_eq!(auth.sign_in(Identity::new("u3")), Err(QuizError::Unauthorized));
    }

    #[test]
    fn test_global_is_shared() {
        let a = AuthContext::global() as *const AuthContext;
        let b = AuthContext::global() as *const AuthContext;
        assert_eq!(a, b);
    }

    #[test]
    fn test_static_gate() {
        assert!(StaticGate(true).is_authorized());
        assert!(!StaticGate(false).is_authorized());
    }
}
