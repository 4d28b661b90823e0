//! Per-session, per-provider conversation history.
//!
//! Each `(session, provider)` pair owns an async mutex around its history.
//! Callers that read, call upstream and write back hold the pair's guard for
//! the whole cycle, so concurrent requests on one pair are serialized and no
//! appended turn is lost. Distinct pairs never contend. The number of pairs
//! is bounded; at capacity the least recently used idle pair is evicted. A
//! pair whose guard is held is never evicted, so the bound is exceeded
//! temporarily when every pair is in use.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::types::{ConversationHistory, ProviderId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    session: String,
    provider: ProviderId,
}

type SharedHistory = Arc<AsyncMutex<ConversationHistory>>;

struct Slot {
    history: SharedHistory,
    last_used: u64,
}

struct StoreInner {
    slots: HashMap<SessionKey, Slot>,
    tick: u64,
    max_sessions: usize,
}

/// In-memory conversation store, owned by the dispatcher.
pub struct ConversationStore {
    inner: Mutex<StoreInner>,
}

impl ConversationStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                slots: HashMap::new(),
                tick: 0,
                max_sessions: max_sessions.max(1),
            }),
        }
    }

    fn existing(&self, session: &str, provider: ProviderId) -> Option<SharedHistory> {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let key = SessionKey {
            session: session.to_string(),
            provider,
        };
        inner.slots.get_mut(&key).map(|slot| {
            slot.last_used = tick;
            slot.history.clone()
        })
    }

    fn slot_or_insert(&self, session: &str, provider: ProviderId) -> SharedHistory {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let key = SessionKey {
            session: session.to_string(),
            provider,
        };

        if let Some(slot) = inner.slots.get_mut(&key) {
            slot.last_used = tick;
            return slot.history.clone();
        }

        if inner.slots.len() >= inner.max_sessions {
            // A pair referenced outside the map is locked or being read; never evict it
            let oldest = inner
                .slots
                .iter()
                .filter(|(_, slot)| Arc::strong_count(&slot.history) == 1)
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(oldest) => {
                    debug!(
                        "Evicting history for session {} ({})",
                        oldest.session, oldest.provider
                    );
                    inner.slots.remove(&oldest);
                }
                None => debug!(
                    "All {} histories in use; exceeding capacity",
                    inner.slots.len()
                ),
            }
        }

        let history = Arc::new(AsyncMutex::new(Vec::new()));
        inner.slots.insert(
            key,
            Slot {
                history: history.clone(),
                last_used: tick,
            },
        );
        history
    }

    /// History for the pair, empty if none was stored. Never fails.
    pub async fn get(&self, session: &str, provider: ProviderId) -> ConversationHistory {
        match self.existing(session, provider) {
            Some(slot) => slot.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Overwrite the pair's history, creating the entry if absent.
    pub async fn put(&self, session: &str, provider: ProviderId, history: ConversationHistory) {
        let slot = self.slot_or_insert(session, provider);
        *slot.lock().await = history;
    }

    /// Exclusive access to the pair's history for a read-modify-write cycle.
    pub async fn lock(
        &self,
        session: &str,
        provider: ProviderId,
    ) -> OwnedMutexGuard<ConversationHistory> {
        self.slot_or_insert(session, provider).lock_owned().await
    }

    /// Number of `(session, provider)` pairs held.
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Turn;

    #[tokio::test]
    async fn test_get_before_put_is_empty() {
        let store = ConversationStore::new(8);
        for provider in ProviderId::all() {
            assert!(store.get("s1", *provider).await.is_empty());
        }
        // Reads do not create entries
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = ConversationStore::new(8);
        store
            .put("s1", ProviderId::DeepSeek, vec![Turn::user("one")])
            .await;
        store
            .put("s1", ProviderId::DeepSeek, vec![Turn::user("two")])
            .await;

        assert_eq!(
            store.get("s1", ProviderId::DeepSeek).await,
            vec![Turn::user("two")]
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_pairs_are_isolated() {
        let store = ConversationStore::new(8);
        store.put("s1", ProviderId::DeepSeek, vec![Turn::user("hi")]).await;

        assert!(store.get("s2", ProviderId::DeepSeek).await.is_empty());
        assert!(store.get("s1", ProviderId::OpenAI).await.is_empty());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = ConversationStore::new(2);
        store.put("a", ProviderId::DeepSeek, vec![Turn::user("a")]).await;
        store.put("b", ProviderId::DeepSeek, vec![Turn::user("b")]).await;

        // Touch "a" so "b" is the least recently used
        let _ = store.get("a", ProviderId::DeepSeek).await;
        store.put("c", ProviderId::DeepSeek, vec![Turn::user("c")]).await;

        assert_eq!(store.len(), 2);
        assert!(store.get("b", ProviderId::DeepSeek).await.is_empty());
        assert_eq!(store.get("a", ProviderId::DeepSeek).await.len(), 1);
    }

    #[tokio::test]
    async fn test_locked_pair_survives_eviction() {
        let store = ConversationStore::new(2);
        let mut guard = store.lock("a", ProviderId::DeepSeek).await;
        store.put("b", ProviderId::DeepSeek, vec![Turn::user("b")]).await;
        store.put("c", ProviderId::DeepSeek, vec![Turn::user("c")]).await;

        guard.push(Turn::user("in-flight"));
        drop(guard);

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("a", ProviderId::DeepSeek).await,
            vec![Turn::user("in-flight")]
        );
        // "b" was the only idle pair
        assert!(store.get("b", ProviderId::DeepSeek).await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_exceeded_when_every_pair_is_locked() {
        let store = ConversationStore::new(1);
        let first = store.lock("a", ProviderId::DeepSeek).await;
        let second = store.lock("b", ProviderId::DeepSeek).await;

        assert_eq!(store.len(), 2);
        drop(first);
        drop(second);

        // Back under pressure with idle pairs, eviction resumes
        store.put("c", ProviderId::DeepSeek, vec![Turn::user("c")]).await;
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(ConversationStore::new(8));
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut guard = store.lock("shared", ProviderId::DeepSeek).await;
                let mut history = guard.clone();
                tokio::task::yield_now().await;
                history.push(Turn::user(format!("m{}", i)));
                *guard = history;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("shared", ProviderId::DeepSeek).await.len(), 16);
    }
}
