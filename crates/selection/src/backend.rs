//! Bulk "select all" resolution against the active search backend.
//!
//! The registry only sees [`BulkUuidResolver`]. Which implementation sits
//! behind it is decided once, from [`SelectionConfig::backend`], when the
//! [`BackendContext`] is built:
//! - [`LastQueryResolver`] re-runs a search on the legacy single-process engine
//! - [`DirectQueryResolver`] asks the distributed index for matching identifiers
//! - [`UnsupportedResolver`] stands in when no bulk capability exists

mod direct;
mod last_query;
mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{resolve_max_hits, BackendKind, SelectionConfig, SettingsProvider};
use crate::error::{Result, SelectionError};
use crate::session::SessionSearchState;

pub use direct::DirectQueryResolver;
pub use last_query::LastQueryResolver;
pub use memory::{MemoryHits, MemoryIndex};

/// A search as issued by the request layer and remembered on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Whether the engine should compute facet summaries alongside hits.
    #[serde(default = "default_build_summary")]
    pub build_summary: bool,
}

fn default_build_summary() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: BTreeMap::new(),
            build_summary: true,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Executed search whose identifiers can be read back in rank order.
pub trait SearchHits: Send + Sync + fmt::Debug {
    fn identifiers(&self, limit: usize) -> Result<Vec<String>>;
}

/// Legacy engine: each call runs on a fresh searcher.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn execute(&self, request: &SearchRequest) -> Result<Arc<dyn SearchHits>>;
}

/// Distributed index that answers identifier queries directly.
#[async_trait]
pub trait IdentifierIndex: Send + Sync {
    async fn matching_identifiers(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Turns "everything matching the current context" into at most `max_hits` keys.
#[async_trait]
pub trait BulkUuidResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        search: &SessionSearchState,
        query: Option<&str>,
        max_hits: usize,
    ) -> Result<Vec<String>>;
}

/// Resolver for deployments whose backend has no bulk identifier lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedResolver;

#[async_trait]
impl BulkUuidResolver for UnsupportedResolver {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn resolve(
        &self,
        _search: &SessionSearchState,
        _query: Option<&str>,
        _max_hits: usize,
    ) -> Result<Vec<String>> {
        Err(SelectionError::Unsupported(
            "search backend cannot resolve identifiers in bulk".to_string(),
        ))
    }
}

/// Explicit query if one was supplied and is not blank.
pub(crate) fn explicit_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|query| !query.is_empty())
}

/// Search collaborators available to the process.
#[derive(Default, Clone)]
pub struct Backends {
    pub legacy: Option<Arc<dyn SearchIndex>>,
    pub distributed: Option<Arc<dyn IdentifierIndex>>,
}

/// Everything bulk selection needs besides the session itself.
#[derive(Clone)]
pub struct BackendContext {
    resolver: Arc<dyn BulkUuidResolver>,
    settings: Arc<dyn SettingsProvider>,
    timeout: Duration,
}

impl fmt::Debug for BackendContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendContext")
            .field("resolver", &self.resolver.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackendContext {
    pub fn new(
        resolver: Arc<dyn BulkUuidResolver>,
        settings: Arc<dyn SettingsProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            settings,
            timeout,
        }
    }

    /// Picks the resolver named by the config. A configured backend that was
    /// not supplied degrades to [`UnsupportedResolver`].
    pub fn from_config(config: &SelectionConfig, backends: Backends) -> Self {
        let resolver: Arc<dyn BulkUuidResolver> = match (config.backend, backends) {
            (BackendKind::LastQuery, Backends { legacy: Some(index), .. }) => {
                Arc::new(LastQueryResolver::new(index))
            }
            (BackendKind::DirectQuery, Backends { distributed: Some(index), .. }) => {
                Arc::new(DirectQueryResolver::new(index))
            }
            (BackendKind::Disabled, _) => Arc::new(UnsupportedResolver),
            (kind, _) => {
                log::warn!("selection backend {kind:?} configured but not available");
                Arc::new(UnsupportedResolver)
            }
        };
        Self::new(
            resolver,
            Arc::new(config.clone()),
            config.search_timeout(),
        )
    }

    pub fn resolver_name(&self) -> &'static str {
        self.resolver.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Resolves "select all" to a bounded key list.
///
/// Any resolver error, including a timeout, yields an empty list.
pub async fn resolve_bulk(
    search: &SessionSearchState,
    query: Option<&str>,
    backend: &BackendContext,
) -> Vec<String> {
    let max_hits = resolve_max_hits(backend.settings.as_ref());
    let started = Instant::now();
    let resolved = match tokio::time::timeout(
        backend.timeout,
        backend.resolver.resolve(search, query, max_hits),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SelectionError::Timeout(backend.timeout)),
    };

    match resolved {
        Ok(mut keys) => {
            keys.truncate(max_hits);
            log::debug!(
                "bulk selection resolver={} max_hits={} resolved={} elapsed_ms={}",
                backend.resolver.name(),
                max_hits,
                keys.len(),
                started.elapsed().as_millis(),
            );
            keys
        }
        Err(error) => {
            log::warn!(
                "bulk selection resolver={} failed, selecting nothing: {}",
                backend.resolver.name(),
                error
            );
            Vec::new()
        }
    }
}
