use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.lock().map(|n| *n).unwrap_or_else(|_| Instant::now())
    }
}

/// Shared key/value cache. Entries expire `ttl` after being set; expired
/// entries are dropped on read of that key and swept on every `set`.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    inner: Arc<RwLock<HashMap<K, (Instant, V)>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        {
            let read = self.inner.read().await;
            match read.get(key) {
                Some((stored_at, value)) if now.duration_since(*stored_at) <= self.ttl => {
                    return Some(value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut write = self.inner.write().await;
        if let Some((stored_at, _)) = write.get(key) {
            if now.duration_since(*stored_at) > self.ttl {
                write.remove(key);
            }
        }
        None
    }

    /// Inserts `value` and sweeps every expired entry, so keys that are
    /// never read again still leave the map.
    pub async fn set(&self, key: K, value: V) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut write = self.inner.write().await;
        write.retain(|_, (stored_at, _)| now.duration_since(*stored_at) <= ttl);
        write.insert(key, (now, value));
    }

    pub async fn delete(&self, key: &K) -> bool {
        self.inner.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
