//! In-memory session state

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::models::{Role, User};
use crate::error::{Error, Result};

/// A logged-in pair; token and user exist together or not at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Everything the UI reads about who is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionState {
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

/// Tab-wide session container
///
/// Clones share state. Every mutation is one synchronous update and wakes
/// subscribers.
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Set token and user together and finish loading
    pub fn set_auth(&self, access_token: impl Into<String>, user: User) {
        let access_token = access_token.into();
        self.state.send_modify(|state| {
            state.session = Some(Session { access_token, user });
            state.loading = false;
        });
    }

    /// Replace the token of the current session
    pub fn set_access_token(&self, access_token: impl Into<String>) -> Result<()> {
        let access_token = access_token.into();
        let mut updated = false;
        self.state.send_if_modified(|state| match state.session.as_mut() {
            Some(session) => {
                session.access_token = access_token;
                updated = true;
                true
            }
            None => false,
        });
        if updated {
            Ok(())
        } else {
            Err(Error::NoActiveSession)
        }
    }

    /// Replace the user of the current session
    pub fn set_user(&self, user: User) -> Result<()> {
        let mut updated = false;
        self.state.send_if_modified(|state| match state.session.as_mut() {
            Some(session) => {
                session.user = user;
                updated = true;
                true
            }
            None => false,
        });
        if updated {
            Ok(())
        } else {
            Err(Error::NoActiveSession)
        }
    }

    /// Drop the session; a no-op when already empty
    pub fn clear_auth(&self) {
        self.state.send_if_modified(|state| {
            let changed = state.session.is_some() || state.loading;
            state.session = None;
            state.loading = false;
            changed
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(str::to_owned)
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().role()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}
