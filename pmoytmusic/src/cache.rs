//! Cache de réponses avec TTL et déduplication des requêtes en vol
//!
//! Deux structures indépendantes :
//!
//! - [`ResponseCache`] : valeurs horodatées, une entrée plus vieille que le TTL
//!   est considérée absente et supprimée à la lecture (pas de thread
//!   d'éviction) ;
//! - [`InFlight`] : au plus une opération en cours par clé, tous les appelants
//!   concurrents partagent le même futur. L'entrée est retirée dès que
//!   l'opération se termine, succès ou échec.
//!
//! L'horloge est injectable ([`Clock`]) pour tester le TTL sans attendre.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
#[cfg(any(test, feature = "test-util"))]
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Source de temps en millisecondes depuis l'epoch
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// Horloge murale
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Horloge manuelle pour les tests (feature `test-util`)
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: i64,
}

/// Cache clé/valeur avec TTL et éviction paresseuse
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResponseCache<V> {
    /// Crée un cache basé sur l'horloge système
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Crée un cache avec une horloge spécifique
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Récupère une valeur, `None` si absente ou expirée
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl.as_millis() as i64;
        let mut entries = lock(&self.entries);

        let entry = entries.get(key)?;
        if now - entry.inserted_at > ttl_ms {
            entries.remove(key);
            debug!("cache entry {} expired", key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Ajoute ou remplace une valeur
    pub fn set(&self, key: impl Into<String>, value: V) {
        let inserted_at = self.clock.now_ms();
        lock(&self.entries).insert(key.into(), CacheEntry { value, inserted_at });
    }

    /// Invalide une entrée
    pub fn invalidate(&self, key: &str) {
        lock(&self.entries).remove(key);
    }

    /// Nombre d'entrées stockées (expirées comprises tant qu'elles n'ont pas été relues)
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Futur partagé entre les appelants d'une même clé
pub type SharedFetch<T> = Shared<BoxFuture<'static, T>>;

/// Table des opérations en cours, une par clé
pub struct InFlight<T: Clone> {
    pending: Arc<Mutex<HashMap<String, SharedFetch<T>>>>,
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Retourne l'opération en cours pour `key`, ou lance `factory`
    ///
    /// `factory` n'est appelé que si aucune opération n'est en cours.
    pub fn dedup<F, Fut>(&self, key: &str, factory: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if let Some(existing) = pending.get(key) {
            debug!("joining in-flight request {}", key);
            return existing.clone();
        }

        let table = Arc::clone(&self.pending);
        let owned_key = key.to_string();
        let operation = factory();
        let shared = async move {
            let output = operation.await;
            lock(&table).remove(&owned_key);
            output
        }
        .boxed()
        .shared();

        pending.insert(key.to_string(), shared.clone());
        shared
    }

    /// Nombre d'opérations en cours
    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TTL: Duration = Duration::from_secs(120);

    #[test]
    fn test_cache_ttl_boundary() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = ResponseCache::with_clock(TTL, clock.clone());

        cache.set("k", "value".to_string());

        clock.advance(TTL - Duration::from_millis(1));
        assert_eq!(cache.get("k").as_deref(), Some("value"));

        clock.advance(Duration::from_millis(2));
        assert_eq!(cache.get("k"), None);
        // évincée à la lecture
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_set_refreshes_timestamp() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResponseCache::with_clock(TTL, clock.clone());

        cache.set("k", 1);
        clock.advance(Duration::from_secs(100));
        cache.set("k", 2);
        clock.advance(Duration::from_secs(100));
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_cache_invalidate() {
        let cache = ResponseCache::new(TTL);
        cache.set("k", 1);
        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test]
    async fn test_inflight_single_invocation() {
        let inflight: InFlight<u32> = InFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let calls = calls.clone();
                inflight.dedup("search:abba", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    42
                })
            })
            .collect();

        assert_eq!(inflight.len(), 1);
        let results = futures::future::join_all(handles).await;

        assert_eq!(results, vec![42; 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn test_inflight_entry_removed_on_failure() {
        let inflight: InFlight<Result<u32, String>> = InFlight::new();

        let failed = inflight
            .dedup("k", || async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(inflight.is_empty());

        // une nouvelle tentative relance bien l'opération
        let ok = inflight.dedup("k", || async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn test_inflight_distinct_keys() {
        let inflight: InFlight<&'static str> = InFlight::new();
        let a = inflight.dedup("a", || async { "a" });
        let b = inflight.dedup("b", || async { "b" });
        assert_eq!(inflight.len(), 2);
        assert_eq!((a.await, b.await), ("a", "b"));
    }
}
