use std::{collections::HashMap, hash::Hash, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    error::SessionError,
    session::{Session, Step, Transition},
};

/// Active sessions, one per conversation.
///
/// A session is created by [`SessionStore::begin`] and removed as soon as it
/// finishes, so a key maps to at most one in-progress form.
#[derive(Clone, Debug)]
pub struct SessionStore<K> {
    inner: Arc<Mutex<HashMap<K, Session>>>,
}

impl<K> Default for SessionStore<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K> SessionStore<K>
where
    K: Eq + Hash,
{
    /// Start a fresh session for `key`, dropping any partial one.
    pub async fn begin(&self, key: K) -> Step {
        let session = Session::new();
        let step = session.step();
        let mut guard = self.inner.lock().await;
        if guard.insert(key, session).is_some() {
            tracing::debug!("restarted an unfinished session");
        }
        step
    }

    pub async fn get(&self, key: &K) -> Option<Session> {
        let guard = self.inner.lock().await;
        guard.get(key).cloned()
    }

    /// Feed an answer to the session of `key`.
    ///
    /// Returns `None` when `key` has no active session. A finished session is
    /// removed before returning.
    pub async fn advance(&self, key: &K, text: &str) -> Option<Result<Transition, SessionError>> {
        let mut guard = self.inner.lock().await;
        let session = guard.get_mut(key)?;
        let result = session.accept(text);
        if matches!(result, Ok(Transition::Finished(_)) | Err(_)) {
            guard.remove(key);
        }
        Some(result)
    }

    pub async fn discard(&self, key: &K) -> bool {
        let mut guard = self.inner.lock().await;
        guard.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
