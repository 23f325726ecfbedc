//! Backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::Refresh;

pub const DEFAULT_INDEX: &str = "acl";
pub const DEFAULT_PAGE_SIZE: usize = 1000;
/// Elasticsearch's default `index.max_result_window`.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 10_000;

// Characters Elasticsearch rejects anywhere in an index name.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Index namespace holding every bucket
    #[serde(default = "default_index")]
    pub index: String,
    /// Prepended to each bucket name to form its collection name
    #[serde(default)]
    pub prefix: String,
    /// Consistency mode passed to every write
    #[serde(default)]
    pub refresh: Refresh,
    /// Initial search page size, before the total-driven re-fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Largest page size a re-fetch may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_owned()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            index: default_index(),
            prefix: String::new(),
            refresh: Refresh::default(),
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_index(&self.index)?;
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        if self.max_page_size < self.page_size {
            return Err(ConfigError::InvalidMaxPageSize {
                page_size: self.page_size,
                max_page_size: self.max_page_size,
            });
        }
        Ok(())
    }
}

fn validate_index(index: &str) -> Result<(), ConfigError> {
    let invalid = index.is_empty()
        || index == "."
        || index == ".."
        || index.starts_with(['-', '_', '+'])
        || index.chars().any(|c| c.is_uppercase())
        || index.contains(FORBIDDEN_INDEX_CHARS);

    if invalid {
        return Err(ConfigError::InvalidIndex(index.to_owned()));
    }
    Ok(())
}
