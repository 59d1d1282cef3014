//! Listing transports
//!
//! A transport fetches the raw listing page of one folder. The cache owns
//! error recovery; transports just report what went wrong.

use crate::{HelperError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Source of raw folder listing pages
pub trait ListingTransport: Send + Sync + 'static {
    /// Fetch the raw listing page for `folder_id`
    fn fetch_raw_listing(&self, folder_id: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Default listing URL prefix; the folder id is appended
pub const DEFAULT_LISTING_BASE_URL: &str = "https://drive.google.com/drive/folders/";

/// Fetches listing pages over HTTP.
///
/// Credentials are not managed here: an optional `Cookie` header value is
/// forwarded as-is with every request.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("drive-helper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            cookie: None,
        })
    }

    /// Forward this cookie header with every request
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn listing_url(&self, folder_id: &str) -> String {
        format!("{}{}", self.base_url, folder_id)
    }
}

#[cfg(feature = "http")]
impl ListingTransport for HttpTransport {
    async fn fetch_raw_listing(&self, folder_id: &str) -> Result<String> {
        let mut request = self.client.get(self.listing_url(folder_id));
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Reads saved listing pages from `<dir>/<folder_id>.html`
#[derive(Debug, Clone)]
pub struct DirTransport {
    dir: PathBuf,
}

impl DirTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn page_path(&self, folder_id: &str) -> Result<PathBuf> {
        if folder_id.is_empty() || folder_id.contains(&['/', '\\'][..]) || folder_id.starts_with('.') {
            return Err(HelperError::Transport(format!(
                "Invalid folder id: {:?}",
                folder_id
            )));
        }
        Ok(self.dir.join(format!("{folder_id}.html")))
    }
}

impl ListingTransport for DirTransport {
    async fn fetch_raw_listing(&self, folder_id: &str) -> Result<String> {
        let path = self.page_path(folder_id)?;
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            HelperError::Transport(format!("{}: {}", path.display(), e))
        })
    }
}

/// In-memory pages with a call counter
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for `folder_id`; unknown ids fail
    pub fn with_page(mut self, folder_id: impl Into<String>, page: impl Into<String>) -> Self {
        self.pages.insert(folder_id.into(), page.into());
        self
    }

    /// Sleep this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ListingTransport for MemoryTransport {
    async fn fetch_raw_listing(&self, folder_id: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.pages
            .get(folder_id)
            .cloned()
            .ok_or_else(|| HelperError::Transport(format!("No listing for folder {}", folder_id)))
    }
}
