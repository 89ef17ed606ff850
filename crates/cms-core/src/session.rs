//! Per-client session state.
//!
//! A [`Session`] holds the signed-in username, if any, and a one-shot flash
//! message. Handlers receive the current session as a plain value and hand
//! back the updated one with their response; [`SessionStore`] keeps sessions
//! between requests, keyed by an opaque random id carried in a cookie.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Session data for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
    message: Option<String>,
}

impl Session {
    /// A session with nobody signed in and no message.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session already signed in as `username`.
    #[must_use]
    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            message: None,
        }
    }

    /// The signed-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }

    /// Move to the authenticated state.
    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    /// Move to the anonymous state. The flash message is kept.
    pub fn sign_out(&mut self) {
        self.username = None;
    }

    /// Set the flash message, replacing any previous one.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Builder form of [`flash`](Self::flash).
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.flash(message);
        self
    }

    /// The pending flash message, without consuming it.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Consume the pending flash message. Called when a page is rendered.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }
}

/// Default idle lifetime of a stored session.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default upper bound on stored sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

/// In-memory session storage keyed by session id.
///
/// A session that has not been loaded or saved for `idle_timeout` is gone.
/// The store never holds more than `max_sessions` entries: starting a session
/// in a full store first drops expired entries and then, if still full, the
/// least recently seen one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    /// Create an empty session store with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session store with explicit limits.
    ///
    /// A `max_sessions` of zero is treated as one.
    #[must_use]
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store a new session and return its freshly generated id.
    pub async fn start(&self, session: Session) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.max_sessions {
            let before = sessions.len();
            sessions.retain(|_, entry| entry.last_seen.elapsed() < self.idle_timeout);
            if sessions.len() >= self.max_sessions {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_seen)
                    .map(|(id, _)| id.clone());
                if let Some(oldest) = oldest {
                    sessions.remove(&oldest);
                }
            }
            tracing::debug!(evicted = before - sessions.len(), "session store full");
        }

        sessions.insert(
            id.clone(),
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Look up a live session by id. An expired session is removed.
    pub async fn load(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        if entry.last_seen.elapsed() >= self.idle_timeout {
            sessions.remove(id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Replace the session stored under `id`.
    pub async fn save(&self, id: &str, session: Session) {
        self.sessions.write().await.insert(
            id.to_owned(),
            Entry {
                session,
                last_seen: Instant::now(),
            },
        );
    }

    /// Forget a session.
    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// Number of stored sessions, including expired ones not yet dropped.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out_transitions() {
        let mut session = Session::anonymous();
        assert!(!session.is_signed_in());

        session.sign_in("admin");
        assert_eq!(session.username(), Some("admin"));

        session.flash("You have been signed out.");
        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.message(), Some("You have been signed out."));
    }

    #[test]
    fn flash_is_one_shot_and_overwritten() {
        let mut session = Session::anonymous().with_message("first");
        session.flash("second");

        assert_eq!(session.take_message().as_deref(), Some("second"));
        assert_eq!(session.take_message(), None);
    }

    #[tokio::test]
    async fn store_start_load_save_remove() {
        let store = SessionStore::new();
        let id = store.start(Session::signed_in("admin")).await;
        assert_eq!(id.len(), 32);
        assert_eq!(store.load(&id).await, Some(Session::signed_in("admin")));

        store.save(&id, Session::anonymous()).await;
        assert_eq!(store.load(&id).await, Some(Session::anonymous()));

        store.remove(&id).await;
        assert!(store.load(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn full_store_evicts_least_recently_seen() {
        let store = SessionStore::with_limits(DEFAULT_IDLE_TIMEOUT, 2);
        let first = store.start(Session::signed_in("a")).await;
        let second = store.start(Session::signed_in("b")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.load(&first).await.is_some());

        let third = store.start(Session::signed_in("c")).await;
        assert_eq!(store.len().await, 2);
        assert!(store.load(&second).await.is_none());
        assert!(store.load(&first).await.is_some());
        assert!(store.load(&third).await.is_some());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::with_limits(Duration::ZERO, 10);
        let id = store.start(Session::signed_in("admin")).await;

        assert!(store.load(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = SessionStore::new();
        let a = store.start(Session::anonymous()).await;
        let b = store.start(Session::anonymous()).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }
}
