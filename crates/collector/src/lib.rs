//! Guided form: asks name, age and grade one after the other and appends the
//! finished answers to the record table.
//!
//! [`Collector`] glues the per-conversation [`SessionStore`] to a
//! [`RecordStore`]. It produces [`Reply`] values and leaves sending them to
//! the transport.

use std::{fmt, hash::Hash, time::Duration};

pub use error::{SessionError, StoreError};
pub use record::{NewRecord, Record, RecordStore, SqliteRecordStore};
pub use session::{Draft, Session, Step, Transition};
pub use store::SessionStore;

mod error;
pub mod record;
mod session;
mod store;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// How often a finished record is offered to the store before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): doubles every time.
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// What the bot should answer after a form event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Ask the question of the step.
    Prompt(Step),
    /// The record was stored with this id.
    Saved { id: i32 },
    /// The record could not be stored; the session is gone.
    SaveFailed,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Prompt(step) => f.write_str(step.prompt()),
            Reply::Saved { id } => write!(f, "{} Номер анкеты: {id}.", Step::Complete.prompt()),
            Reply::SaveFailed => f.write_str(
                "Не удалось сохранить анкету. Попробуйте ещё раз командой /form.",
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Collector<S, K> {
    sessions: SessionStore<K>,
    store: S,
    retry: RetryPolicy,
}

impl<S, K> Collector<S, K>
where
    S: RecordStore,
    K: Eq + Hash + fmt::Debug + Send + Sync,
{
    pub fn new(store: S) -> Self {
        Self {
            sessions: SessionStore::default(),
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            attempts: retry.attempts.max(1),
            base_delay: retry.base_delay,
        };
        self
    }

    pub fn sessions(&self) -> &SessionStore<K> {
        &self.sessions
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start (or restart) the form for `key`.
    pub async fn begin(&self, key: K) -> Reply {
        tracing::debug!("form started for {key:?}");
        Reply::Prompt(self.sessions.begin(key).await)
    }

    /// Handle a text message. `None` when `key` isn't filling the form.
    pub async fn handle_text(&self, key: &K, text: &str) -> Option<Reply> {
        let transition = match self.sessions.advance(key, text).await? {
            Ok(transition) => transition,
            Err(err) => {
                tracing::warn!("dropping session of {key:?}: {err}");
                return None;
            }
        };

        match transition {
            Transition::Prompt(step) => Some(Reply::Prompt(step)),
            Transition::Finished(record) => match self.persist(&record).await {
                Ok(id) => {
                    tracing::info!("form of {key:?} stored as record {id}");
                    Some(Reply::Saved { id })
                }
                Err(err) => {
                    tracing::error!("failed to store the form of {key:?}: {err}");
                    Some(Reply::SaveFailed)
                }
            },
        }
    }

    async fn persist(&self, record: &NewRecord) -> Result<i32, StoreError> {
        let mut attempt = 1;
        loop {
            match self.store.insert(record).await {
                Ok(id) => return Ok(id),
                Err(err) if attempt >= self.retry.attempts => return Err(err),
                Err(err) => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!("store attempt {attempt} failed: {err}, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use sea_orm::DbErr;

    use super::*;

    /// Store that fails the first `failures` inserts.
    #[derive(Clone, Default)]
    struct FlakyStore {
        failures: u32,
        calls: Arc<AtomicU32>,
        stored: Arc<std::sync::Mutex<Vec<NewRecord>>>,
    }

    impl RecordStore for FlakyStore {
        async fn insert(&self, record: &NewRecord) -> Result<i32, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(StoreError::Database(DbErr::Custom("database is locked".into())));
            }
            let mut stored = self.stored.lock().unwrap();
            stored.push(record.clone());
            Ok(stored.len() as i32)
        }
    }

    fn no_wait() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn retry_delay_doubles() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay(1), Duration::from_millis(200));
        assert_eq!(retry.delay(2), Duration::from_millis(400));
        assert_eq!(retry.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn replies_render_russian_text() {
        assert_eq!(Reply::Prompt(Step::AwaitingAge).to_string(), "Сколько тебе лет?");
        assert_eq!(
            Reply::Saved { id: 4 }.to_string(),
            "Спасибо! Анкета заполнена. Номер анкеты: 4."
        );
        assert!(Reply::SaveFailed.to_string().contains("/form"));
    }

    #[tokio::test]
    async fn message_without_session_is_ignored() {
        let collector = Collector::<_, i64>::new(FlakyStore::default());
        assert_eq!(collector.handle_text(&1, "hello").await, None);
        assert_eq!(collector.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_store_failure_is_retried() {
        let store = FlakyStore {
            failures: 2,
            ..Default::default()
        };
        let collector = Collector::new(store).with_retry(no_wait());
        collector.begin(1_i64).await;
        collector.handle_text(&1, "Оля").await;
        collector.handle_text(&1, "11").await;

        let reply = collector.handle_text(&1, "5А").await;
        assert_eq!(reply, Some(Reply::Saved { id: 1 }));
        assert_eq!(collector.store().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_store_failure_is_reported() {
        let store = FlakyStore {
            failures: u32::MAX,
            ..Default::default()
        };
        let collector = Collector::new(store).with_retry(no_wait());
        collector.begin(9_i64).await;
        collector.handle_text(&9, "a").await;
        collector.handle_text(&9, "b").await;

        let reply = collector.handle_text(&9, "c").await;
        assert_eq!(reply, Some(Reply::SaveFailed));
        assert_eq!(collector.store().calls.load(Ordering::SeqCst), 3);
        assert!(collector.sessions().get(&9).await.is_none());
        assert!(collector.store().stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let collector = Collector::new(FlakyStore::default()).with_retry(RetryPolicy {
            attempts: 0,
            base_delay: Duration::ZERO,
        });
        collector.begin(2_i64).await;
        collector.handle_text(&2, "a").await;
        collector.handle_text(&2, "b").await;
        assert_eq!(
            collector.handle_text(&2, "c").await,
            Some(Reply::Saved { id: 1 })
        );
    }
}
