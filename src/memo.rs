use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::Result;

/// String-keyed lookup-or-compute cache for async computations.
///
/// The lock is only held for the lookup and the write-back, never across the
/// computation itself, so two concurrent misses on the same key may compute
/// twice. Errors are propagated and never cached.
pub struct MemoCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> MemoCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or awaits `compute` and stores its
    /// result under `key` before returning it.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(hit) = self.entries.lock().unwrap().get(key) {
            return Ok(hit.clone());
        }

        let value = compute().await?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::Error;

    use super::*;

    #[tokio::test]
    async fn computes_each_key_once() {
        let cache = MemoCache::new();
        let computed = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("42", || async {
                    computed.fetch_add(1, Ordering::SeqCst);
                    Ok("computed".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "computed");
        }

        assert_eq!(computed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_compute_separately() {
        let cache = MemoCache::new();

        let a = cache
            .get_or_compute("a", || async { Ok(1_u64) })
            .await
            .unwrap();
        let b = cache
            .get_or_compute("b", || async { Ok(2_u64) })
            .await
            .unwrap();

        assert_eq!((a, b), (1, 2));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = MemoCache::new();
        let attempts = AtomicUsize::new(0);

        let failed: Result<u64> = cache
            .get_or_compute("flaky", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::Io(std::io::Error::other("first try fails")))
            })
            .await;
        assert!(failed.is_err());

        let value = cache
            .get_or_compute("flaky", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
