//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::time::Duration;

/// Requests that take longer than this fail with a timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    pub catalog_url: String,
    /// Bound on the total duration of a single request.
    pub timeout: Duration,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional user agent override.
    pub user_agent: Option<String>,
}

impl CatalogClientConfig {
    /// Config for `catalog_url` with default timeout and no extra headers.
    pub fn new(catalog_url: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            extra_headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

/// Normalize a configured API URL into a base URL.
///
/// Endpoints are addressed directly off the service root,
/// so a trailing `/` and a trailing `/api` segment are dropped.
pub fn clean_base_url(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_suffix("/api").unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url).to_string()
}
