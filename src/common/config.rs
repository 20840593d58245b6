use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{Result, VlistError};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default idle time after which a page is evicted (milliseconds)
pub const DEFAULT_PAGE_TIMEOUT_MS: u64 = 10_000;

/// Smallest allowed page cap: page 0, the page being read and one neighbour.
pub const MIN_MAX_PAGES: usize = 3;

/// Construction-time settings of a virtualized collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of items fetched per page
    pub page_size: usize,
    /// Idle time in milliseconds after which a page (other than page 0) is dropped
    pub page_timeout_ms: u64,
    /// Optional hard cap on the number of tracked pages
    pub max_pages: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_timeout_ms: DEFAULT_PAGE_TIMEOUT_MS,
            max_pages: None,
        }
    }
}

impl CacheConfig {
    pub fn new(page_size: usize, page_timeout_ms: u64) -> Self {
        Self {
            page_size,
            page_timeout_ms,
            max_pages: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_timeout_ms(mut self, page_timeout_ms: u64) -> Self {
        self.page_timeout_ms = page_timeout_ms;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CacheConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(VlistError::InvalidConfig(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if let Some(max_pages) = self.max_pages {
            if max_pages < MIN_MAX_PAGES {
                return Err(VlistError::InvalidConfig(format!(
                    "max_pages must be at least {}, got {}",
                    MIN_MAX_PAGES, max_pages
                )));
            }
        }
        Ok(())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }
}
