//! Batch scan scheduler
//!
//! Refreshes many folders through the [`FolderCache`] in fixed-size batches.
//! Batches run strictly one after another; the folders inside a batch are
//! fetched concurrently. Only one scan may run at a time.

use crate::cache::FolderCache;
use crate::status::StatusLevel;
use crate::summary::ContentSummary;
use crate::transport::ListingTransport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Folders fetched concurrently per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Outcome for one folder of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderStatus {
    Done(ContentSummary),
    Failed(String),
}

impl FolderStatus {
    /// Counted towards the scan's success total: a non-empty summary
    pub fn is_success(&self) -> bool {
        matches!(self, FolderStatus::Done(summary) if !summary.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderResult {
    pub folder_id: String,
    pub status: FolderStatus,
}

/// Progress after a completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

impl ScanProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed.min(self.total) as f64 / self.total as f64
    }
}

/// Result of a finished scan; `results` follows input order
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub results: Vec<FolderResult>,
    pub success: usize,
    pub total: usize,
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Another scan was in progress; nothing was done
    AlreadyRunning,
    /// Empty folder list
    NoFolders,
    Completed(ScanReport),
}

/// Hooks called while a scan runs. All methods default to no-ops.
pub trait ScanObserver: Send + Sync {
    fn on_status(&self, _level: StatusLevel, _message: &str) {}

    fn on_batch_start(&self, _index: usize, _folder_ids: &[String]) {}

    fn on_folder(&self, _result: &FolderResult) {}

    fn on_progress(&self, _progress: ScanProgress) {}
}

impl ScanObserver for () {}

/// Clears the running flag however the scan ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight batch scanner
#[derive(Debug)]
pub struct ScanScheduler<T> {
    cache: Arc<FolderCache<T>>,
    batch_size: usize,
    running: AtomicBool,
}

impl<T: ListingTransport> ScanScheduler<T> {
    pub fn new(cache: Arc<FolderCache<T>>) -> Self {
        Self::with_batch_size(cache, DEFAULT_BATCH_SIZE)
    }

    /// A batch size of 0 is treated as 1
    pub fn with_batch_size(cache: Arc<FolderCache<T>>, batch_size: usize) -> Self {
        Self {
            cache,
            batch_size: batch_size.max(1),
            running: AtomicBool::new(false),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Force-refresh every folder, batch by batch.
    ///
    /// Returns [`ScanOutcome::AlreadyRunning`] without touching anything if a
    /// scan is in progress.
    pub async fn scan_all(&self, folders: &[String], observer: &dyn ScanObserver) -> ScanOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            observer.on_status(StatusLevel::Warn, "Already scanning...");
            return ScanOutcome::AlreadyRunning;
        }
        let _running = RunningGuard(&self.running);

        if folders.is_empty() {
            observer.on_status(StatusLevel::Err, "No folders found");
            return ScanOutcome::NoFolders;
        }

        let total = folders.len();
        info!(total, batch_size = self.batch_size, "Scan started");
        observer.on_status(StatusLevel::Warn, &format!("Scanning {} folders...", total));

        let mut report = ScanReport {
            results: Vec::with_capacity(total),
            total,
            ..Default::default()
        };

        for (index, batch) in folders.chunks(self.batch_size).enumerate() {
            debug!(batch = index, size = batch.len(), "Batch started");
            observer.on_batch_start(index, batch);

            for (folder_id, status) in batch.iter().zip(self.run_batch(batch).await) {
                if let FolderStatus::Failed(reason) = &status {
                    warn!(folder_id = %folder_id, error = %reason, "Folder scan failed");
                }

                let result = FolderResult {
                    folder_id: folder_id.clone(),
                    status,
                };
                if result.status.is_success() {
                    report.success += 1;
                }
                observer.on_folder(&result);
                report.results.push(result);
            }

            report.batches += 1;
            let progress = ScanProgress {
                processed: report.results.len(),
                total,
            };
            observer.on_progress(progress);
            observer.on_status(
                StatusLevel::Warn,
                &format!("{}/{} scanned...", progress.processed.min(total), total),
            );
        }

        info!(success = report.success, total, "Scan finished");
        let level = if report.success > 0 {
            StatusLevel::Ok
        } else {
            StatusLevel::Err
        };
        observer.on_status(level, &format!("✅ {}/{} scanned", report.success, total));

        ScanOutcome::Completed(report)
    }

    /// Force-refresh one batch concurrently; statuses follow `batch` order.
    ///
    /// Tasks live in a [`JoinSet`], so dropping the scan aborts the batch.
    async fn run_batch(&self, batch: &[String]) -> Vec<FolderStatus> {
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::with_capacity(batch.len());
        for (slot, folder_id) in batch.iter().enumerate() {
            let cache = Arc::clone(&self.cache);
            let folder_id = folder_id.clone();
            let handle = tasks.spawn(async move { cache.get(&folder_id, true).await });
            slots.insert(handle.id(), slot);
        }

        let mut statuses: Vec<Option<FolderStatus>> = vec![None; batch.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, status) = match joined {
                Ok((id, summary)) => (id, FolderStatus::Done(summary)),
                Err(e) => (e.id(), FolderStatus::Failed(e.to_string())),
            };
            if let Some(&slot) = slots.get(&id) {
                statuses[slot] = Some(status);
            }
        }

        statuses
            .into_iter()
            .map(|status| status.unwrap_or_else(|| FolderStatus::Failed("task lost".into())))
            .collect()
    }
}
