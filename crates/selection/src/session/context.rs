use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::backend::{SearchHits, SearchRequest};
use crate::registry::SelectionRegistry;

/// Search state the request layer leaves on a session for "select all".
#[derive(Debug, Default)]
pub struct SessionSearchState {
    last_request: RwLock<Option<SearchRequest>>,
    cached_hits: RwLock<Option<Arc<dyn SearchHits>>>,
}

impl SessionSearchState {
    pub fn remember_request(&self, request: SearchRequest) {
        *self.last_request.write() = Some(request);
    }

    pub fn remember_hits(&self, hits: Arc<dyn SearchHits>) {
        *self.cached_hits.write() = Some(hits);
    }

    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.read().clone()
    }

    pub fn cached_hits(&self) -> Option<Arc<dyn SearchHits>> {
        self.cached_hits.read().clone()
    }

    pub fn forget(&self) {
        *self.last_request.write() = None;
        *self.cached_hits.write() = None;
    }
}

/// Per-user session state passed explicitly to selection calls.
pub struct SessionContext {
    id: String,
    pub(crate) registry: OnceLock<Arc<SelectionRegistry>>,
    search: SessionSearchState,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("has_registry", &self.registry.get().is_some())
            .field("search", &self.search)
            .finish()
    }
}

impl SessionContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            registry: OnceLock::new(),
            search: SessionSearchState::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn search(&self) -> &SessionSearchState {
        &self.search
    }

    /// The registry if one was created; does not create it.
    pub fn registry(&self) -> Option<Arc<SelectionRegistry>> {
        self.registry.get().cloned()
    }
}
