//! The single writer of session state and its mirrors
//!
//! [`AuthSession`] owns the in-memory store, the access token cookie, the
//! cached user in session storage and the refresh token in local storage.
//! Nothing else writes any of them, so the four cannot drift apart.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use axum_extra::extract::cookie::Cookie;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use time::{Duration, OffsetDateTime};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::auth::models::{Role, User};
use crate::config::AuthConfig;
use crate::error::Result;
use crate::session::storage::{CookieStore, Storage, StorageEvent};
use crate::session::store::{SessionState, SessionStore};

/// How a hydration run settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// User restored from session storage, no request made
    FromCache,
    /// The store already held a user, no request made
    AlreadyLoaded,
    /// User loaded from the who-am-I endpoint
    Fetched,
    /// Hydration could not establish a session and everything was cleared
    LoggedOut,
}

/// What role-gated UI may assume about the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Not known yet; render neither guest nor member UI
    Loading,
    Anonymous,
    Authenticated(Role),
}

type HydrationFuture = Shared<BoxFuture<'static, HydrationOutcome>>;

static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);

struct Inner {
    store: SessionStore,
    cookies: Arc<dyn CookieStore>,
    session_storage: Arc<dyn Storage>,
    local_storage: Arc<dyn Storage>,
    api: Arc<dyn ApiClient>,
    settings: AuthConfig,
    hydration: Mutex<Option<HydrationFuture>>,
    hydration_started: AtomicBool,
    /// Written to the logout signal key so a tab can skip its own logouts
    tab_id: String,
}

/// Per-tab session handle; clones share everything
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<Inner>,
}

impl AuthSession {
    pub fn new(
        settings: AuthConfig,
        api: Arc<dyn ApiClient>,
        cookies: Arc<dyn CookieStore>,
        session_storage: Arc<dyn Storage>,
        local_storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: SessionStore::new(),
                cookies,
                session_storage,
                local_storage,
                api,
                settings,
                hydration: Mutex::new(None),
                hydration_started: AtomicBool::new(false),
                tab_id: NEXT_TAB_ID.fetch_add(1, Ordering::Relaxed).to_string(),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.store.subscribe()
    }

    pub fn viewer(&self) -> Viewer {
        let state = self.inner.store.snapshot();
        match (state.role(), state.loading) {
            (Some(role), _) => Viewer::Authenticated(role),
            (None, true) => Viewer::Loading,
            (None, false) => Viewer::Anonymous,
        }
    }

    /// Whether hydration has been started in this tab
    pub fn hydration_started(&self) -> bool {
        self.inner.hydration_started.load(Ordering::SeqCst)
    }

    /// Record a successful login in the store and all mirrors
    pub fn login(&self, access_token: &str, refresh_token: Option<&str>, user: User) -> Result<()> {
        let cached = serde_json::to_string(&user)?;
        let settings = &self.inner.settings;

        self.inner.store.set_auth(access_token, user);
        self.inner.cookies.set(self.access_cookie(access_token));
        if let Some(refresh_token) = refresh_token {
            self.inner
                .local_storage
                .set_item(&settings.refresh_token_key, refresh_token);
        }
        self.inner
            .session_storage
            .set_item(&settings.session_cache_key, &cached);

        tracing::info!("session established");
        Ok(())
    }

    /// Swap the access token of the current session
    pub fn set_access_token(&self, access_token: &str) -> Result<()> {
        self.inner.store.set_access_token(access_token)?;
        self.inner.cookies.set(self.access_cookie(access_token));
        Ok(())
    }

    /// Replace the profile of the current session
    pub fn set_user(&self, user: User) -> Result<()> {
        let cached = serde_json::to_string(&user)?;
        self.inner.store.set_user(user)?;
        self.inner
            .session_storage
            .set_item(&self.inner.settings.session_cache_key, &cached);
        Ok(())
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.store.set_loading(loading);
    }

    /// Remove every session artifact and tell other tabs. Safe to call at
    /// any time, any number of times.
    pub fn logout(&self) {
        let settings = &self.inner.settings;
        let had_session = self.inner.store.snapshot().session.is_some();

        self.inner.store.clear_auth();
        self.inner.cookies.set(
            Cookie::build((settings.cookie_name.clone(), String::new()))
                .path("/")
                .max_age(Duration::ZERO)
                .build(),
        );
        self.inner.local_storage.remove_item(&settings.refresh_token_key);
        self.inner.session_storage.remove_item(&settings.session_cache_key);

        // Other tabs hear this even when no refresh token was stored
        self.inner
            .local_storage
            .set_item(&settings.logout_signal_key, &self.inner.tab_id);
        self.inner.local_storage.remove_item(&settings.logout_signal_key);

        if had_session {
            tracing::info!("session cleared");
        } else {
            tracing::debug!("logout with no active session");
        }
    }

    /// Rebuild the in-memory session after a reload
    ///
    /// Runs at most once per `AuthSession`; later and concurrent callers get
    /// the first run's outcome. The work happens on its own task, so a caller
    /// that goes away mid-flight does not stop the store from being updated.
    pub async fn hydrate(&self) -> HydrationOutcome {
        let pending = {
            let mut slot = self
                .inner
                .hydration
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| {
                self.inner.hydration_started.store(true, Ordering::SeqCst);
                let session = self.clone();
                let task = tokio::spawn(async move { session.run_hydration().await });
                // The future is stored in `inner`, so it must not keep it alive
                let inner = Arc::downgrade(&self.inner);
                async move {
                    match task.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::warn!(error = %e, "hydration task failed");
                            if let Some(inner) = inner.upgrade() {
                                AuthSession { inner }.logout();
                            }
                            HydrationOutcome::LoggedOut
                        }
                    }
                }
                .boxed()
                .shared()
            })
            .clone()
        };
        pending.await
    }

    async fn run_hydration(&self) -> HydrationOutcome {
        let token = self.inner.cookies.get(&self.inner.settings.cookie_name);

        if let Some(user) = self.cached_user() {
            return match token {
                Some(token) => {
                    self.inner.store.set_auth(token, user);
                    HydrationOutcome::FromCache
                }
                None => {
                    tracing::debug!("cached user without access token");
                    self.logout();
                    HydrationOutcome::LoggedOut
                }
            };
        }

        if self.inner.store.user().is_some() {
            self.inner.store.set_loading(false);
            return HydrationOutcome::AlreadyLoaded;
        }

        self.inner.store.set_loading(true);
        match self.inner.api.current_user(token.as_deref()).await {
            Ok(user) => match token {
                Some(token) => {
                    let cached = serde_json::to_string(&user).ok();
                    self.inner.store.set_auth(token, user);
                    if let Some(cached) = cached {
                        self.inner
                            .session_storage
                            .set_item(&self.inner.settings.session_cache_key, &cached);
                    }
                    HydrationOutcome::Fetched
                }
                None => {
                    tracing::warn!("current user resolved without an access token");
                    self.logout();
                    HydrationOutcome::LoggedOut
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "session hydration failed");
                self.logout();
                HydrationOutcome::LoggedOut
            }
        }
    }

    /// Clear this tab when another tab logs out
    ///
    /// `events` should come from the local storage shared between tabs. The
    /// task holds no strong reference to the session: it stops at the first
    /// event after the last `AuthSession` clone is dropped, or when the
    /// storage goes away. Abort the returned handle to stop it sooner.
    pub fn watch_other_tabs(&self, mut events: broadcast::Receiver<StorageEvent>) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match inner.upgrade() {
                        Some(inner) => AuthSession { inner }.on_storage_event(&event),
                        None => break,
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "storage events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn on_storage_event(&self, event: &StorageEvent) {
        let settings = &self.inner.settings;
        if event.key != settings.logout_signal_key {
            return;
        }
        match event.new_value.as_deref() {
            Some(tab_id) if tab_id != self.inner.tab_id => {}
            _ => return,
        }
        if self.inner.store.snapshot().session.is_none() {
            return;
        }
        tracing::info!("logged out in another tab");
        self.inner.session_storage.remove_item(&settings.session_cache_key);
        self.inner.store.clear_auth();
    }

    fn cached_user(&self) -> Option<User> {
        let key = &self.inner.settings.session_cache_key;
        let raw = self.inner.session_storage.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable cached user");
                self.inner.session_storage.remove_item(key);
                None
            }
        }
    }

    fn access_cookie(&self, access_token: &str) -> Cookie<'static> {
        let settings = &self.inner.settings;
        Cookie::build((settings.cookie_name.clone(), access_token.to_string()))
            .path("/")
            .expires(OffsetDateTime::now_utc() + Duration::days(settings.cookie_days))
            .build()
    }
}
