//! Per-login editing sessions.
//!
//! A session owns the user's working copy of the document. Edits land on the
//! draft only; `save` commits it through the credential store and `revert`
//! replaces it with the committed copy. Sessions are in-memory and vanish on
//! restart, on logout, or once their TTL elapses.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::debug;

use crate::models::portfolio::Document;

pub const SESSION_COOKIE: &str = "folio_session";

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Working copy. Never persisted until saved.
    pub draft: Document,
    /// True once the draft diverges from the committed document.
    pub dirty: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token → session map shared by all handlers.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session seeded with `draft` and returns its token.
    pub fn open(&self, username: &str, draft: Document) -> String {
        let token = new_token();
        let now = Utc::now();
        let session = Session {
            username: username.to_string(),
            draft,
            dirty: false,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), session);
        debug!("Opened session for {username}");
        token
    }

    /// Runs `f` against a live session. Expired sessions are evicted and
    /// reported as absent.
    pub fn with_session<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let expired = sessions.get(token)?.is_expired(Utc::now());
        if expired {
            if let Some(session) = sessions.remove(token) {
                debug!("Session for {} expired", session.username);
            }
            return None;
        }
        sessions.get_mut(token).map(f)
    }

    #[cfg(test)]
    pub fn snapshot(&self, token: &str) -> Option<Session> {
        self.with_session(token, |session| session.clone())
    }

    /// Removes the session. Returns whether one existed.
    pub fn close(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        match removed {
            Some(session) => {
                debug!(
                    "Closed session for {} opened at {}",
                    session.username, session.created_at
                );
                true
            }
            None => false,
        }
    }

    /// Drops every expired session and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// 256 bits from the OS RNG, URL-safe base64 without padding.
fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::build_default("alice", "alice@example.com")
    }

    #[test]
    fn test_open_and_edit_draft() {
        let registry = SessionRegistry::new(Duration::hours(1));
        let token = registry.open("alice", doc());
        assert_eq!(token.len(), 43);

        registry
            .with_session(&token, |s| {
                s.draft.personal_info.summary = "Edited".to_string();
                s.dirty = true;
            })
            .unwrap();

        let session = registry.snapshot(&token).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.draft.personal_info.summary, "Edited");
        assert!(session.dirty);
    }

    #[test]
    fn test_tokens_are_unique() {
        let registry = SessionRegistry::new(Duration::hours(1));
        let a = registry.open("alice", doc());
        let b = registry.open("alice", doc());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_close_removes_session() {
        let registry = SessionRegistry::new(Duration::hours(1));
        let token = registry.open("alice", doc());
        assert!(registry.close(&token));
        assert!(!registry.close(&token));
        assert!(registry.snapshot(&token).is_none());
    }

    #[test]
    fn test_unknown_token() {
        let registry = SessionRegistry::new(Duration::hours(1));
        assert!(registry.with_session("nope", |_| ()).is_none());
    }

    #[test]
    fn test_expired_sessions_are_rejected_and_purged() {
        let registry = SessionRegistry::new(Duration::seconds(-1));
        let token = registry.open("alice", doc());
        let other = registry.open("bob", doc());
        assert!(registry.snapshot(&token).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.snapshot(&other).is_none());
        assert_eq!(registry.len(), 0);
    }
}
