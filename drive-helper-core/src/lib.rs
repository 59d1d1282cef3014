//! Drive Helper - folder content counts and item markers
//!
//! Classifies the contents of folders in a file-listing page by type and
//! keeps the results in a request-deduplicating cache, scanned in bounded
//! batches. User-assigned item markers are persisted separately.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod marker;
pub mod parser;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod summary;
pub mod transport;
pub mod view;

pub use cache::FolderCache;
pub use classifier::{classify, Category};
pub use config::{HelperConfig, ViewPolicy};
pub use error::{HelperError, Result};
pub use marker::{
    FileSnapshotStore, Marker, MarkerStats, MarkerStore, MemorySnapshotStore, SnapshotStore,
    STORAGE_KEY,
};
pub use parser::{parse, ExtractionStrategy};
pub use scheduler::{
    FolderResult, FolderStatus, ScanObserver, ScanOutcome, ScanProgress, ScanReport,
    ScanScheduler, DEFAULT_BATCH_SIZE,
};
pub use session::{Command, CommandOutcome, RowView, Session};
pub use status::{StatusLevel, StatusLog, StatusSink};
pub use summary::ContentSummary;
pub use transport::{DirTransport, ListingTransport, MemoryTransport, DEFAULT_LISTING_BASE_URL};
pub use view::{RowDescriptor, ViewSnapshot, ViewTracker};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Drive Helper version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
