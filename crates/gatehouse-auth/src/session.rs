use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_types::{SessionTokens, UserProfile};

pub const SESSION_COOKIE: &str = "gatehouse_session";

/// Abandoned login attempts are dropped after this long.
const PENDING_TTL: Duration = Duration::from_secs(600);

/// Redirect-target property bag stored between the login challenge and the
/// provider callback.
#[derive(Clone, Debug)]
pub struct PendingLogin {
    pub csrf_state: String,
    pub nonce: String,
    pub pkce_verifier: String,
    pub redirect_target: String,
    pub created_at: Instant,
}

#[derive(Clone, Debug)]
pub struct EstablishedSession {
    pub profile: UserProfile,
    pub tokens: SessionTokens,
}

/// In-memory session store keyed by the value of the session cookie.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    pending: HashMap<String, PendingLogin>,
    active: HashMap<String, EstablishedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a pending login under a fresh session id. Abandoned attempts
    /// are swept here rather than on a timer.
    pub async fn begin_login(&self, pending: PendingLogin) -> String {
        let sessionId = new_session_id();
        let mut inner = self.inner.write().await;
        inner
            .pending
            .retain(|_, p| p.created_at.elapsed() < PENDING_TTL);
        inner.pending.insert(sessionId.clone(), pending);
        sessionId
    }

    pub async fn take_pending(&self, session_id: &str) -> Option<PendingLogin> {
        self.inner.write().await.pending.remove(session_id)
    }

    /// The session id rotates when the login completes; the pre-login id is
    /// never promoted to an authenticated one.
    pub async fn establish(&self, session: EstablishedSession) -> String {
        let sessionId = new_session_id();
        self.inner
            .write()
            .await
            .active
            .insert(sessionId.clone(), session);
        sessionId
    }

    pub async fn get(&self, session_id: &str) -> Option<EstablishedSession> {
        self.inner.read().await.active.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<EstablishedSession> {
        self.inner.write().await.active.remove(session_id)
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(target: &str) -> PendingLogin {
        PendingLogin {
            csrf_state: "state".into(),
            nonce: "nonce".into(),
            pkce_verifier: "verifier".into(),
            redirect_target: target.into(),
            created_at: Instant::now(),
        }
    }

    fn session() -> EstablishedSession {
        EstablishedSession {
            profile: UserProfile::default(),
            tokens: SessionTokens::default(),
        }
    }

    #[tokio::test]
    async fn pending_login_is_consumed_once() {
        let store = SessionStore::new();
        let id = store.begin_login(pending("/profile")).await;

        let taken = store.take_pending(&id).await.expect("pending entry");
        assert_eq!(taken.redirect_target, "/profile");
        assert!(store.take_pending(&id).await.is_none());
    }

    #[tokio::test]
    async fn establish_rotates_the_session_id() {
        let store = SessionStore::new();
        let loginId = store.begin_login(pending("/")).await;
        store.take_pending(&loginId).await;

        let sessionId = store.establish(session()).await;
        assert_ne!(loginId, sessionId);
        assert!(store.get(&loginId).await.is_none());
        assert!(store.get(&sessionId).await.is_some());
    }

    #[tokio::test]
    async fn remove_signs_the_session_out() {
        let store = SessionStore::new();
        let id = store.establish(session()).await;

        assert!(store.remove(&id).await.is_some());
        assert!(store.get(&id).await.is_none());
        assert!(store.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn stale_pending_logins_are_swept() {
        let store = SessionStore::new();
        let mut stale = pending("/");
        let Some(staleInstant) = Instant::now().checked_sub(PENDING_TTL + Duration::from_secs(1))
        else {
            // Monotonic clock too young to fabricate a stale entry.
            return;
        };
        stale.created_at = staleInstant;
        let staleId = store.begin_login(stale).await;

        // The next login sweeps; its own fresh entry must survive while the
        // stale one goes.
        let freshId = store.begin_login(pending("/profile")).await;

        assert!(store.take_pending(&staleId).await.is_none());
        assert!(store.take_pending(&freshId).await.is_some());
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
