//! Command dispatch over the cache, scheduler and marker store
//!
//! A [`Session`] owns one instance of each service for the lifetime of the
//! process. Front ends (a page script bridge, the CLI) translate user
//! actions into [`Command`] values instead of calling services directly.

use crate::cache::FolderCache;
use crate::config::{HelperConfig, ViewPolicy};
use crate::marker::{Marker, MarkerStats, MarkerStore, SnapshotStore};
use crate::scheduler::{ScanObserver, ScanOutcome, ScanScheduler};
use crate::status::{StatusLevel, StatusSink};
use crate::summary::ContentSummary;
use crate::transport::ListingTransport;
use crate::view::{debounce_views, RowDescriptor, ViewSnapshot, ViewTracker};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A user action with its target and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rescan these folders
    Scan { folder_ids: Vec<String> },
    /// Drop cached summaries and every marker
    ClearAll,
    SetMarker { item_id: String, marker: Marker },
    /// Current summaries and markers for these rows
    ShowCached { rows: Vec<RowDescriptor> },
    ViewChanged(ViewSnapshot),
}

/// What the page should show for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub item_id: String,
    pub marker: Marker,
    /// Cached summary; folders only
    pub summary: Option<ContentSummary>,
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Scan(ScanOutcome),
    Cleared,
    MarkerSet(MarkerStats),
    Rows(Vec<RowView>),
    /// Folder recounted from the view, if any
    ViewUpdated(Option<(String, ContentSummary)>),
}

/// Forwards scan status lines to a [`StatusSink`]
struct StatusObserver<'a>(&'a dyn StatusSink);

impl ScanObserver for StatusObserver<'_> {
    fn on_status(&self, level: StatusLevel, message: &str) {
        self.0.set_status(level, message);
    }
}

pub struct Session<T, S> {
    cache: Arc<FolderCache<T>>,
    scheduler: ScanScheduler<T>,
    markers: Mutex<MarkerStore<S>>,
    tracker: Mutex<ViewTracker>,
    view_policy: ViewPolicy,
    status: Arc<dyn StatusSink>,
}

impl<T: ListingTransport, S: SnapshotStore> Session<T, S> {
    /// Build the services and load persisted markers
    pub fn new(
        config: &HelperConfig,
        transport: T,
        snapshots: S,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        let cache = Arc::new(FolderCache::new(transport));
        let scheduler = ScanScheduler::with_batch_size(Arc::clone(&cache), config.batch_size);
        let markers = MarkerStore::open(snapshots);
        info!(markers = markers.len(), "Session started");

        let session = Self {
            cache,
            scheduler,
            markers: Mutex::new(markers),
            tracker: Mutex::new(ViewTracker::new()),
            view_policy: config.view_policy.clone(),
            status,
        };
        session.status.set_status(StatusLevel::Neutral, "Ready");
        session
    }

    pub fn cache(&self) -> &Arc<FolderCache<T>> {
        &self.cache
    }

    pub fn scheduler(&self) -> &ScanScheduler<T> {
        &self.scheduler
    }

    pub async fn dispatch(&self, command: Command) -> CommandOutcome {
        match command {
            Command::Scan { folder_ids } => {
                let observer = StatusObserver(self.status.as_ref());
                CommandOutcome::Scan(self.scheduler.scan_all(&folder_ids, &observer).await)
            }
            Command::ClearAll => {
                self.clear_all();
                CommandOutcome::Cleared
            }
            Command::SetMarker { item_id, marker } => {
                CommandOutcome::MarkerSet(self.set_marker(&item_id, marker))
            }
            Command::ShowCached { rows } => CommandOutcome::Rows(self.cached_rows(&rows)),
            Command::ViewChanged(view) => CommandOutcome::ViewUpdated(self.view_changed(&view)),
        }
    }

    /// Scan with a caller-supplied observer (per-folder rendering etc.)
    pub async fn scan_with(&self, folder_ids: &[String], observer: &dyn ScanObserver) -> ScanOutcome {
        self.scheduler.scan_all(folder_ids, observer).await
    }

    pub fn clear_all(&self) {
        self.cache.clear();
        self.markers().clear_all();
        self.status.set_status(StatusLevel::Neutral, "Cleared");
    }

    pub fn set_marker(&self, item_id: &str, marker: Marker) -> MarkerStats {
        let stats = {
            let mut markers = self.markers();
            markers.set(item_id, marker);
            markers.stats()
        };

        if stats.total > 0 {
            self.status.set_status(
                StatusLevel::Ok,
                &format!("{}/{} marked", stats.done, stats.total),
            );
        }
        stats
    }

    pub fn marker(&self, item_id: &str) -> Marker {
        self.markers().get(item_id)
    }

    /// All markers, sorted by item id
    pub fn markers_list(&self) -> Vec<(String, Marker)> {
        self.markers()
            .iter()
            .map(|(id, marker)| (id.to_string(), marker))
            .collect()
    }

    pub fn marker_stats(&self) -> MarkerStats {
        self.markers().stats()
    }

    pub fn cached_rows(&self, rows: &[RowDescriptor]) -> Vec<RowView> {
        let markers = self.markers();
        rows.iter()
            .map(|row| RowView {
                item_id: row.item_id.clone(),
                marker: markers.get(&row.item_id),
                summary: if row.is_folder {
                    self.cache.peek(&row.item_id)
                } else {
                    None
                },
            })
            .collect()
    }

    /// Recount the viewed folder from its visible rows when its file set changed
    pub fn view_changed(&self, view: &ViewSnapshot) -> Option<(String, ContentSummary)> {
        let update = self
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(view);

        if let Some((folder_id, summary)) = &update {
            self.cache.insert(folder_id.clone(), *summary);
            self.status.set_status(StatusLevel::Ok, "Updated!");
        }
        update
    }

    /// Report the resting status unless a scan is running
    pub fn idle_status(&self) {
        if self.scheduler.is_running() {
            return;
        }
        let cached = self.cache.len();
        if cached > 0 {
            self.status
                .set_status(StatusLevel::Ok, &format!("{} folders cached", cached));
        } else {
            self.status.set_status(StatusLevel::Neutral, "Ready");
        }
    }

    /// Apply debounced view notifications until every sender is dropped.
    ///
    /// Views delivered while a scan runs are ignored.
    pub async fn watch_views(&self, rx: mpsc::Receiver<ViewSnapshot>) {
        debounce_views(rx, self.view_policy.debounce(), |view| {
            if self.scheduler.is_running() {
                debug!("Scan running, view ignored");
                return;
            }
            self.view_changed(&view);
        })
        .await;
    }

    fn markers(&self) -> MutexGuard<'_, MarkerStore<S>> {
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
