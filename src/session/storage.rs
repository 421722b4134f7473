//! Client-side persistence surfaces: key/value storage and cookies
//!
//! Session storage is per tab. Local storage and cookies are shared by every
//! tab of the browser, so clones of one [`MemoryStorage`] or
//! [`MemoryCookieStore`] model that sharing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use axum_extra::extract::cookie::Cookie;
use time::OffsetDateTime;
use tokio::sync::broadcast;

/// A change made to a storage area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed
    pub new_value: Option<String>,
}

/// Key/value storage area
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    /// Removing an absent key does nothing
    fn remove_item(&self, key: &str);
}

/// Cookie storage as seen by page code
pub trait CookieStore: Send + Sync {
    /// Value of a live cookie
    fn get(&self, name: &str) -> Option<String>;
    /// Store a cookie; a zero `Max-Age` or past `Expires` deletes it
    fn set(&self, cookie: Cookie<'static>);
}

const EVENT_CAPACITY: usize = 64;

/// In-memory storage area that broadcasts its changes
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Receive every later change made through any clone
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        // No subscribers is the normal case for session storage
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
        });
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.publish(key, Some(value.to_string()));
    }

    fn remove_item(&self, key: &str) {
        let removed = self
            .items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            self.publish(key, None);
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStorage {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            events: self.events.clone(),
        }
    }
}

/// In-memory cookie jar honouring `Max-Age` and `Expires`
#[derive(Clone, Default)]
pub struct MemoryCookieStore {
    cookies: Arc<RwLock<HashMap<String, Cookie<'static>>>>,
}

fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    if let Some(max_age) = cookie.max_age() {
        if max_age.is_zero() || max_age.is_negative() {
            return true;
        }
    }
    matches!(cookie.expires_datetime(), Some(expires) if expires <= now)
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full stored cookie, attributes included
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        let now = OffsetDateTime::now_utc();
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .filter(|cookie| !is_expired(cookie, now))
            .cloned()
    }

    /// `Cookie` request header value for the live cookies
    pub fn header_value(&self) -> Option<String> {
        let now = OffsetDateTime::now_utc();
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        let pairs: Vec<String> = cookies
            .values()
            .filter(|cookie| !is_expired(cookie, now))
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|cookie| cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        if is_expired(&cookie, OffsetDateTime::now_utc()) {
            cookies.remove(cookie.name());
        } else {
            cookies.insert(cookie.name().to_string(), cookie);
        }
    }
}
