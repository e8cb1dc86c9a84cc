//! Per-session selection registry.
//!
//! This crate tracks which items a user has selected, per named namespace:
//! - Synchronized per-namespace key sets and the selection action protocol
//! - Bulk "select all" resolved through a pluggable search backend
//! - Session contexts and an expiring in-memory session store
//! - JSON settings for the select-all bound, backend and timeouts

pub mod backend;
pub mod config;
pub mod error;
pub mod registry;
pub mod selection;
pub mod session;
pub mod types;

// Re-export main types
pub use backend::{
    resolve_bulk, BackendContext, Backends, BulkUuidResolver, DirectQueryResolver,
    IdentifierIndex, LastQueryResolver, MemoryHits, MemoryIndex, SearchHits, SearchIndex,
    SearchRequest, UnsupportedResolver,
};
pub use config::{
    load_or_create_selection_config, resolve_max_hits, BackendKind, SelectionConfig,
    SettingsProvider, DEFAULT_MAX_HITS,
};
pub use error::{Result, SelectionError};
pub use registry::{update_selection, SelectionRegistry};
pub use selection::Selection;
pub use session::{SessionContext, SessionSearchState, SessionStore};
pub use types::{
    ActionRequest, AnnotatedBatch, AnnotatedItem, SelectableItem, SelectionAction,
    METADATA_NAMESPACE,
};
