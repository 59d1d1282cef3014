//! Folder aggregation cache
//!
//! Memoizes one [`ContentSummary`] per folder and deduplicates concurrent
//! computations: however many callers ask for the same uncached folder at
//! once, the transport is hit a single time and everyone gets that result.
//!
//! Entries never expire. They are replaced by a forced refresh or dropped by
//! [`FolderCache::clear`].

use crate::parser;
use crate::summary::ContentSummary;
use crate::transport::ListingTransport;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type PendingSummary = Arc<OnceCell<ContentSummary>>;

#[derive(Debug, Default)]
struct CacheState {
    /// Completed summaries
    entries: HashMap<String, ContentSummary>,
    /// Computations started but not yet settled
    in_flight: HashMap<String, PendingSummary>,
    /// Bumped by `clear`; results from older generations are not stored
    generation: u64,
}

/// Request-deduplicating summary cache in front of a [`ListingTransport`]
#[derive(Debug)]
pub struct FolderCache<T> {
    transport: T,
    state: Mutex<CacheState>,
}

impl<T: ListingTransport> FolderCache<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Summary for `folder_id`, fetching and parsing its listing on a miss.
    ///
    /// `force_refresh` skips the cache-hit check but still joins a
    /// computation that is already in flight. Never fails: transport errors
    /// yield an all-zero summary.
    pub async fn get(&self, folder_id: &str, force_refresh: bool) -> ContentSummary {
        // Check-and-register happens under one lock with no await in between.
        let (pending, generation) = {
            let mut state = self.lock();

            if !force_refresh {
                if let Some(summary) = state.entries.get(folder_id) {
                    debug!(folder_id, "Cache hit");
                    return *summary;
                }
            }

            let generation = state.generation;
            let pending = match state.in_flight.get(folder_id) {
                Some(pending) => {
                    debug!(folder_id, "Joining in-flight fetch");
                    Arc::clone(pending)
                }
                None => {
                    let pending = PendingSummary::default();
                    state.in_flight.insert(folder_id.to_string(), Arc::clone(&pending));
                    pending
                }
            };
            (pending, generation)
        };

        *pending
            .get_or_init(|| self.compute(folder_id, &pending, generation))
            .await
    }

    async fn compute(
        &self,
        folder_id: &str,
        pending: &PendingSummary,
        generation: u64,
    ) -> ContentSummary {
        let entry = InFlightEntry {
            state: &self.state,
            folder_id,
            pending,
            settled: false,
        };
        debug!(folder_id, "Fetching listing");

        let summary = match self.transport.fetch_raw_listing(folder_id).await {
            Ok(page) => parser::parse(&page),
            Err(e) => {
                warn!(folder_id, error = %e, "Listing fetch failed");
                ContentSummary::new()
            }
        };

        {
            let mut state = self.lock();
            if state.generation == generation {
                state.entries.insert(folder_id.to_string(), summary);
            }
        }
        entry.settle();

        summary
    }

    /// Cached summary without fetching
    pub fn peek(&self, folder_id: &str) -> Option<ContentSummary> {
        self.lock().entries.get(folder_id).copied()
    }

    /// Store a summary computed elsewhere, replacing any entry
    pub fn insert(&self, folder_id: impl Into<String>, summary: ContentSummary) {
        self.lock().entries.insert(folder_id.into(), summary);
    }

    /// Drop all entries and stop tracking in-flight computations.
    ///
    /// Running computations are not cancelled; their results are discarded.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Number of computations currently in flight
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unregisters a computation from the in-flight table when it settles,
/// panics or is dropped.
///
/// A computation abandoned while other callers still await it stays
/// registered; one of those callers takes it over.
struct InFlightEntry<'a> {
    state: &'a Mutex<CacheState>,
    folder_id: &'a str,
    pending: &'a PendingSummary,
    settled: bool,
}

impl InFlightEntry<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlightEntry<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = state.in_flight.get(self.folder_id) else {
            return;
        };
        if !Arc::ptr_eq(current, self.pending) {
            return;
        }

        // The table and the leading caller hold one handle each
        if self.settled || Arc::strong_count(self.pending) <= 2 {
            state.in_flight.remove(self.folder_id);
        } else {
            debug!(folder_id = self.folder_id, "Abandoned fetch left to waiting callers");
        }
    }
}
