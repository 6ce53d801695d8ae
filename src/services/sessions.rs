use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::RoundContext;

/// Errors that can occur with session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

/// A session's round context, locked for the duration of a round
pub type SharedContext = Arc<Mutex<RoundContext>>;

/// In-memory store of open rematching sessions
///
/// Each session holds the preferences and matching carried forward between
/// rounds. Idle sessions are evicted after the configured TTL. Rounds on one
/// session are serialized by its mutex; different sessions run independently.
#[derive(Clone)]
pub struct SessionStore {
    sessions: moka::future::Cache<Uuid, SharedContext>,
}

impl SessionStore {
    pub fn new(max_sessions: u64, idle_ttl_secs: u64) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .build();

        Self { sessions }
    }

    /// Store a new context and return its id
    pub async fn create(&self, context: RoundContext) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, Arc::new(Mutex::new(context)))
            .await;
        tracing::debug!("Session opened: {}", id);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Result<SharedContext, SessionError> {
        self.sessions
            .get(id)
            .await
            .ok_or(SessionError::NotFound(*id))
    }

    pub async fn remove(&self, id: &Uuid) -> Result<(), SessionError> {
        match self.sessions.remove(id).await {
            Some(_) => {
                tracing::debug!("Session closed: {}", id);
                Ok(())
            }
            None => Err(SessionError::NotFound(*id)),
        }
    }

    /// Approximate number of open sessions
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Matching, PreferenceSnapshot};
    use crate::models::ParticipantId;
    use std::collections::BTreeMap;

    fn context() -> RoundContext {
        let men = BTreeMap::from([(ParticipantId::from("m1"), vec![ParticipantId::from("w1")])]);
        let women = BTreeMap::from([(ParticipantId::from("w1"), vec![ParticipantId::from("m1")])]);
        let prefs = PreferenceSnapshot::new(men, women).unwrap();
        let matching =
            Matching::from_map(BTreeMap::from([(ParticipantId::from("m1"), ParticipantId::from("w1"))])).unwrap();
        RoundContext::new(prefs, matching).unwrap()
    }

    #[test]
    fn test_create_then_get() {
        tokio_test::block_on(async {
            let store = SessionStore::new(10, 60);
            let id = store.create(context()).await;

            let shared = store.get(&id).await.unwrap();
            assert_eq!(shared.lock().await.round, 0);
        });
    }

    #[test]
    fn test_remove_unknown_session() {
        tokio_test::block_on(async {
            let store = SessionStore::new(10, 60);

            assert!(matches!(
                store.remove(&Uuid::new_v4()).await,
                Err(SessionError::NotFound(_))
            ));
        });
    }

    #[test]
    fn test_removed_session_is_gone() {
        tokio_test::block_on(async {
            let store = SessionStore::new(10, 60);
            let id = store.create(context()).await;

            store.remove(&id).await.unwrap();

            assert!(store.get(&id).await.is_err());
        });
    }
}
