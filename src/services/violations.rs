use crate::api::ConsoleApi;
use crate::cli::StatusFilter;
use crate::domain::models::Violation;
use crate::error::ResolveError;
use crate::services::loader::{LoadState, ResourceLoader, Settled};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// Pure projection of the last fetched list; backend order is preserved.
pub fn filter_violations(list: &[Violation], filter: StatusFilter) -> Vec<Violation> {
    list.iter()
        .filter(|v| match filter {
            StatusFilter::All => true,
            StatusFilter::Open => v.status.eq_ignore_ascii_case("open"),
            StatusFilter::Resolved => v.status.eq_ignore_ascii_case("resolved"),
        })
        .cloned()
        .collect()
}

/// Violation ids with a resolve call outstanding.
#[derive(Debug, Default)]
pub struct InFlightSet {
    ids: Mutex<BTreeSet<i64>>,
}

/// Membership in an `InFlightSet`; the id is removed when this drops.
pub struct InFlightEntry<'a> {
    set: &'a InFlightSet,
    id: i64,
}

impl Drop for InFlightEntry<'_> {
    fn drop(&mut self) {
        self.set.ids().remove(&self.id);
    }
}

impl InFlightSet {
    fn ids(&self) -> MutexGuard<'_, BTreeSet<i64>> {
        self.ids.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn try_insert(&self, id: i64) -> Option<InFlightEntry<'_>> {
        if self.ids().insert(id) {
            Some(InFlightEntry { set: self, id })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn contains(&self, id: i64) -> bool {
        self.ids().contains(&id)
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<i64> {
        self.ids().iter().copied().collect()
    }
}

pub struct ViolationWorkflow<'a, A: ConsoleApi + ?Sized> {
    api: &'a A,
    limit: u32,
    list: ResourceLoader<Vec<Violation>>,
    filter: Mutex<StatusFilter>,
    in_flight: InFlightSet,
}

impl<'a, A: ConsoleApi + ?Sized> ViolationWorkflow<'a, A> {
    pub fn new(api: &'a A, limit: u32) -> Self {
        Self {
            api,
            limit,
            list: ResourceLoader::new("violations"),
            filter: Mutex::new(StatusFilter::All),
            in_flight: InFlightSet::default(),
        }
    }

    /// Full list fetch. A newer refresh supersedes any older one still running.
    pub fn refresh(&self) -> Settled {
        self.list.load(|_| self.api.violations(self.limit))
    }

    pub fn state(&self) -> LoadState<Vec<Violation>> {
        self.list.state()
    }

    pub fn failure_message(&self) -> String {
        self.list.failure_message()
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        *self.filter.lock().unwrap_or_else(|e| e.into_inner()) = filter;
    }

    pub fn filter(&self) -> StatusFilter {
        *self.filter.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fetched(&self) -> Vec<Violation> {
        self.list.snapshot().unwrap_or_default()
    }

    pub fn visible(&self) -> Vec<Violation> {
        filter_violations(&self.fetched(), self.filter())
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, id: i64) -> bool {
        self.in_flight.contains(id)
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> Vec<i64> {
        self.in_flight.snapshot()
    }

    pub fn resolve(&self, id: i64) -> Result<(), ResolveError> {
        let resolvable = self
            .list
            .snapshot()
            .map(|list| list.iter().any(|v| v.id == id && v.is_open()))
            .unwrap_or(false);
        if !resolvable {
            return Err(ResolveError::NotResolvable(id));
        }

        let entry = self
            .in_flight
            .try_insert(id)
            .ok_or(ResolveError::AlreadyInFlight(id))?;
        let outcome = self.api.resolve_violation(id);
        drop(entry);

        match outcome {
            Ok(()) => {
                tracing::info!(id, "violation resolved");
                self.refresh();
                Ok(())
            }
            Err(source) => {
                tracing::error!(id, error = %source, "resolve failed");
                Err(ResolveError::Transport { id, source })
            }
        }
    }

    /// Resolve several ids at once, one worker per id. Results follow input
    /// order with duplicates dropped.
    pub fn resolve_many(&self, ids: &[i64]) -> Vec<(i64, Result<(), ResolveError>)> {
        let mut seen = BTreeSet::new();
        let unique: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        std::thread::scope(|scope| {
            let workers: Vec<_> = unique
                .iter()
                .map(|&id| (id, scope.spawn(move || self.resolve(id))))
                .collect();
            workers
                .into_iter()
                .map(|(id, worker)| {
                    let result = worker
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                    (id, result)
                })
                .collect()
        })
    }
}
