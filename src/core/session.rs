//! Client session state
//!
//! A session is either anonymous or holds a bearer token; there is no
//! implicit in-between. The token round-trips through a [`TokenStore`]
//! under a configurable key, so a restarted client can restore the session
//! it had.

use dashmap::DashMap;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "auth_token";

/// Authentication state. The token is only reachable through the
/// `Authenticated` variant; no sentinel empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { token: String },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token } => Some(token),
        }
    }

    /// `Authorization` header value for outbound requests.
    pub fn bearer_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }
}

/// Where tokens persist between runs (localStorage-shaped: a string KV).
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, token: &str);
    fn remove(&self, key: &str);
}

/// In-memory token store, used in tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, token: &str) {
        self.entries.insert(key.to_string(), token.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Drives the anonymous ⇄ authenticated transitions and keeps the token
/// store in sync with them.
pub struct SessionManager<S: TokenStore> {
    store: S,
    storage_key: String,
    session: Session,
}

impl<S: TokenStore> SessionManager<S> {
    /// Start anonymous; call [`restore`](Self::restore) to pick up a
    /// persisted token.
    pub fn new(store: S, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            session: Session::Anonymous,
        }
    }

    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    /// Adopt the persisted token, if any. Without one the session stays
    /// anonymous.
    pub fn restore(&mut self) -> &Session {
        if let Some(token) = self.store.get(&self.storage_key) {
            self.session = Session::Authenticated { token };
        }
        &self.session
    }

    /// Persist the token and switch to authenticated.
    pub fn login(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.store.set(&self.storage_key, &token);
        self.session = Session::Authenticated { token };
    }

    /// Drop the token everywhere and switch back to anonymous.
    pub fn logout(&mut self) {
        self.store.remove(&self.storage_key);
        self.session = Session::Anonymous;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }
}
