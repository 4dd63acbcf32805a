//! Reusable async fetch cell.

use std::future::Future;
use std::sync::Arc;
use std::sync::RwLock;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::LoadError;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, LoadError>> + Send + Sync>;

#[derive(Debug)]
struct FetchInner<T> {
    data: Option<T>,
    error: Option<LoadError>,
    is_loading: bool,
    enabled: bool,
    generation: u64,
}

/// The result of an async fetch, with a loading flag and an error slot.
///
/// `Fetch<T>` is cheap to clone; clones share state. Only the most recently
/// started fetch may update it, so an overlapping older fetch cannot
/// overwrite newer data. A failed fetch keeps the previous data.
///
/// # Example
///
/// ```ignore
/// let genres = Fetch::new(move || {
///     let client = client.clone();
///     async move { client.find_genres().await.map_err(LoadError::from) }
/// });
/// genres.refetch().await;
/// ```
pub struct Fetch<T> {
    inner: Arc<RwLock<FetchInner<T>>>,
    fetcher: Fetcher<T>,
}

impl<T: Clone + Send + Sync + 'static> Fetch<T> {
    /// Create an enabled fetch cell that has not fetched yet.
    pub fn new<F, Fut>(fetcher: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(RwLock::new(FetchInner {
                data: None,
                error: None,
                is_loading: false,
                enabled: true,
                generation: 0,
            })),
            fetcher: Arc::new(move || fetcher().boxed()),
        }
    }

    /// Builder form of [`Fetch::set_enabled`].
    pub fn enabled(self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    /// A disabled cell ignores [`Fetch::refetch`].
    pub fn set_enabled(&self, enabled: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.enabled = enabled;
        }
    }

    /// Runs the fetcher and stores its result.
    ///
    /// Returns `false` if the cell is disabled or a newer fetch started
    /// before this one finished.
    pub async fn refetch(&self) -> bool {
        let generation = match self.inner.write() {
            Ok(mut guard) if guard.enabled => {
                guard.generation += 1;
                guard.is_loading = true;
                guard.generation
            }
            _ => return false,
        };

        let result = (self.fetcher)().await;

        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        if guard.generation != generation {
            log::debug!("Dropping superseded fetch result");
            return false;
        }
        guard.is_loading = false;
        match result {
            Ok(data) => {
                guard.data = Some(data);
                guard.error = None;
            }
            Err(e) => {
                log::warn!("Fetch failed: {}", e);
                guard.error = Some(e);
            }
        }
        true
    }

    pub fn data(&self) -> Option<T> {
        self.inner.read().ok().and_then(|guard| guard.data.clone())
    }

    pub fn error(&self) -> Option<LoadError> {
        self.inner.read().ok().and_then(|guard| guard.error.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_loading)
            .unwrap_or(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.enabled)
            .unwrap_or(false)
    }
}

impl<T> Clone for Fetch<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_newest_fetch_wins() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let fetch = Fetch::new(move || {
            let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                // The first call finishes last.
                let delay = if call == 1 { 100 } else { 10 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(call)
            }
        });

        let (first, second) = tokio::join!(fetch.refetch(), fetch.refetch());
        assert!(!first);
        assert!(second);
        assert_eq!(fetch.data(), Some(2));
        assert!(!fetch.is_loading());
    }

    #[tokio::test]
    async fn test_error_keeps_data() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let fetch = Fetch::new(move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Ok("genres")
                } else {
                    Err(LoadError::new("offline"))
                }
            }
        });

        assert!(fetch.refetch().await);
        assert!(fetch.refetch().await);
        assert_eq!(fetch.data(), Some("genres"));
        assert_eq!(fetch.error(), Some(LoadError::new("offline")));
    }

    #[tokio::test]
    async fn test_disabled_does_not_fetch() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let fetch = Fetch::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .enabled(false);

        assert!(!fetch.refetch().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!fetch.is_enabled());

        fetch.clone().set_enabled(true);
        assert!(fetch.refetch().await);
        assert_eq!(fetch.data(), Some(()));
    }
}
