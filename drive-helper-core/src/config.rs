use crate::scheduler::DEFAULT_BATCH_SIZE;
use crate::transport::DEFAULT_LISTING_BASE_URL;
use crate::{HelperError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timing policy for folder view notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewPolicy {
    /// Quiet period before a burst of view changes is handled
    pub debounce_ms: u64,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self { debounce_ms: 800 }
    }
}

impl ViewPolicy {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Drive Helper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Folders fetched concurrently per scan batch
    pub batch_size: usize,
    /// Listing URL prefix; the folder id is appended
    pub listing_base_url: String,
    /// Where the marker snapshot is kept (platform data dir when unset)
    pub storage_dir: Option<PathBuf>,
    pub view_policy: ViewPolicy,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            listing_base_url: DEFAULT_LISTING_BASE_URL.to_string(),
            storage_dir: None,
            view_policy: ViewPolicy::default(),
        }
    }
}

impl HelperConfig {
    /// Create a new HelperConfig with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| HelperError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(HelperError::Config("batch_size must be at least 1".into()));
        }
        if self.listing_base_url.is_empty() {
            return Err(HelperError::Config("listing_base_url is empty".into()));
        }
        Ok(())
    }

    /// Set scan batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set listing URL prefix
    pub fn with_listing_base_url(mut self, url: impl Into<String>) -> Self {
        self.listing_base_url = url.into();
        self
    }

    /// Set marker storage directory
    pub fn with_storage_dir(mut self, dir: PathBuf) -> Self {
        self.storage_dir = Some(dir);
        self
    }

    /// Set view debounce
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.view_policy.debounce_ms = debounce_ms;
        self
    }

    /// Storage directory, falling back to `<data dir>/drive-helper`
    pub fn resolved_storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("drive-helper"))
            .ok_or_else(|| HelperError::Config("no data directory on this platform".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HelperConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.view_policy.debounce(), Duration::from_millis(800));
        assert!(config.listing_base_url.starts_with("https://"));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = HelperConfig::new()
            .with_batch_size(3)
            .with_storage_dir(PathBuf::from("/tmp/dh"))
            .with_debounce_ms(100);

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.resolved_storage_dir().unwrap(), PathBuf::from("/tmp/dh"));
        assert_eq!(config.view_policy.debounce_ms, 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch_size": 2}"#).unwrap();

        let config = HelperConfig::from_json_file(&path).unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.view_policy, ViewPolicy::default());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch_size": 0}"#).unwrap();

        let result = HelperConfig::from_json_file(&path);
        assert!(matches!(result, Err(HelperError::Config(_))));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "batch_size = 2").unwrap();

        assert!(matches!(
            HelperConfig::from_json_file(&path),
            Err(HelperError::Config(_))
        ));
    }
}
