//! Client session: store, persisted mirrors, hydration and logout

pub mod client;
pub mod storage;
pub mod store;

pub use client::{AuthSession, HydrationOutcome, Viewer};
pub use storage::{CookieStore, MemoryCookieStore, MemoryStorage, Storage, StorageEvent};
pub use store::{Session, SessionState, SessionStore};
