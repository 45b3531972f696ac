use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-fetch cancellation flag shared between the loader and the fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Success(T),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Committed,
    /// The fetch was cancelled or superseded; its result was dropped.
    Discarded,
}

struct Inner<T> {
    state: LoadState<T>,
    last_success: Option<T>,
    token: CancelToken,
}

/// Tri-state fetch holder shared by every data-bearing view.
///
/// One loader corresponds to one mounted view. Starting a fetch cancels the
/// previous one, so at most one result per loader can ever be committed from
/// a given generation.
pub struct ResourceLoader<T> {
    view: &'static str,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> ResourceLoader<T> {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            inner: Mutex::new(Inner {
                state: LoadState::Loading,
                last_success: None,
                token: CancelToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A panic while holding the lock cannot leave the state half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    pub fn view(&self) -> &'static str {
        self.view
    }

    pub fn failure_message(&self) -> String {
        format!("failed to load {}", self.view)
    }

    pub fn state(&self) -> LoadState<T> {
        self.lock().state.clone()
    }

    /// Last successfully fetched value, kept while a refetch is in flight.
    pub fn snapshot(&self) -> Option<T> {
        self.lock().last_success.clone()
    }

    /// Enter `Loading` under a fresh token, cancelling whatever was in flight.
    pub fn begin(&self) -> CancelToken {
        let mut inner = self.lock();
        inner.token.cancel();
        inner.token = CancelToken::new();
        inner.state = LoadState::Loading;
        inner.token.clone()
    }

    pub fn settle<E: Display>(&self, token: &CancelToken, result: Result<T, E>) -> Settled {
        let mut inner = self.lock();
        if token.is_cancelled() {
            tracing::debug!(view = self.view, "stale fetch result discarded");
            return Settled::Discarded;
        }
        let next = match result {
            Ok(value) => {
                inner.last_success = Some(value.clone());
                LoadState::Success(value)
            }
            Err(e) => {
                tracing::error!(view = self.view, error = %e, "fetch failed");
                LoadState::Error
            }
        };
        inner.state = next;
        Settled::Committed
    }

    /// Single-shot fetch: no retry and no backoff.
    pub fn load<E: Display>(&self, fetch: impl FnOnce(&CancelToken) -> Result<T, E>) -> Settled {
        let token = self.begin();
        let result = fetch(&token);
        self.settle(&token, result)
    }

    /// Leaving the view: anything still in flight must not write state.
    #[cfg(test)]
    pub fn unmount(&self) {
        self.lock().token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadState, ResourceLoader, Settled};

    #[test]
    fn starts_loading_then_commits_success() {
        let loader = ResourceLoader::<u32>::new("dashboard");
        assert_eq!(loader.state(), LoadState::Loading);
        assert_eq!(loader.load(|_| Ok::<_, String>(7)), Settled::Committed);
        assert_eq!(loader.state(), LoadState::Success(7));
        assert_eq!(loader.snapshot(), Some(7));
    }

    #[test]
    fn failure_is_generic_error_state() {
        let loader = ResourceLoader::<u32>::new("risk");
        loader.load(|_| Err::<u32, _>("connection refused"));
        assert_eq!(loader.state(), LoadState::Error);
        assert_eq!(loader.snapshot(), None);
        assert_eq!(loader.failure_message(), "failed to load risk");
    }

    #[test]
    fn refetch_reenters_loading() {
        let loader = ResourceLoader::<u32>::new("history");
        loader.load(|_| Ok::<_, String>(1));
        let token = loader.begin();
        assert_eq!(loader.state(), LoadState::Loading);
        assert_eq!(loader.snapshot(), Some(1));
        loader.settle(&token, Ok::<_, String>(2));
        assert_eq!(loader.state(), LoadState::Success(2));
    }

    #[test]
    fn superseded_fetch_cannot_overwrite_newer_result() {
        let loader = ResourceLoader::<&'static str>::new("violations");
        let older = loader.begin();
        let newer = loader.begin();
        assert!(older.is_cancelled());

        assert_eq!(loader.settle(&newer, Ok::<_, String>("fresh")), Settled::Committed);
        assert_eq!(loader.settle(&older, Ok::<_, String>("stale")), Settled::Discarded);
        assert_eq!(loader.state(), LoadState::Success("fresh"));
    }

    #[test]
    fn result_after_unmount_is_dropped() {
        let loader = ResourceLoader::<u32>::new("system");
        let token = loader.begin();
        loader.unmount();
        assert_eq!(loader.settle(&token, Ok::<_, String>(5)), Settled::Discarded);
        assert_eq!(loader.state(), LoadState::Loading);
    }

    #[test]
    fn fetch_sees_cancellation_of_its_own_token() {
        let loader = ResourceLoader::<bool>::new("dashboard");
        let settled = loader.load(|token| {
            loader.unmount();
            Ok::<_, String>(token.is_cancelled())
        });
        assert_eq!(settled, Settled::Discarded);
    }
}
