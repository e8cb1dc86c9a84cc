//! Per-session selection registry.
//!
//! Maps namespace names to [`Selection`] sets and applies the selection
//! action protocol to them.
//!
//! ## Locking
//!
//! The namespace map sits behind one `RwLock` that is only write-locked to
//! create a namespace on first touch. Each [`Selection`] carries its own lock,
//! so actions on different namespaces never contend. Bulk resolution runs
//! with no lock held; its result is installed with a single
//! [`Selection::replace`], so readers see either the previous selection or
//! the resolved one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::{resolve_bulk, BackendContext};
use crate::selection::Selection;
use crate::session::SessionContext;
use crate::types::{
    ActionRequest, AnnotatedBatch, AnnotatedItem, SelectableItem, SelectionAction,
    METADATA_NAMESPACE,
};

#[derive(Debug)]
pub struct SelectionRegistry {
    namespaces: RwLock<HashMap<String, Arc<Selection>>>,
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionRegistry {
    pub fn new() -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert(METADATA_NAMESPACE.to_string(), Arc::new(Selection::new()));
        Self {
            namespaces: RwLock::new(namespaces),
        }
    }

    /// Returns the session's registry, attaching a new one on first access.
    ///
    /// Concurrent first accesses agree on a single registry.
    pub fn get_or_create(session: &SessionContext) -> Arc<SelectionRegistry> {
        session
            .registry
            .get_or_init(|| {
                log::debug!("selection registry created for session {}", session.id());
                Arc::new(SelectionRegistry::new())
            })
            .clone()
    }

    fn selection(&self, namespace: &str) -> Arc<Selection> {
        if let Some(existing) = self.namespaces.read().get(namespace).cloned() {
            return existing;
        }

        let mut namespaces = self.namespaces.write();
        namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(Selection::new()))
            .clone()
    }

    /// Applies `action` to `namespace` and returns the resulting selection size.
    ///
    /// Never fails: key-based actions with no keys, and `AddAll` whose
    /// resolution fails, leave a well-defined selection behind.
    pub async fn apply_action(
        &self,
        namespace: &str,
        action: SelectionAction,
        keys: &[String],
        query: Option<&str>,
        session: &SessionContext,
        backend: &BackendContext,
    ) -> usize {
        let selection = self.selection(namespace);

        if action.requires_keys() && keys.is_empty() {
            log::debug!("selection {action} on {namespace} with no keys ignored");
            return selection.len();
        }

        match action {
            SelectionAction::Add => {
                selection.insert_all(keys.iter().cloned());
            }
            SelectionAction::Remove => {
                selection.remove_all(keys);
            }
            SelectionAction::ClearAndAdd => {
                selection.replace(keys.iter().cloned());
            }
            SelectionAction::RemoveAll => selection.clear(),
            SelectionAction::AddAll if namespace == METADATA_NAMESPACE => {
                let resolved = resolve_bulk(session.search(), query, backend).await;
                selection.replace(resolved);
            }
            // Search only yields metadata identifiers.
            SelectionAction::AddAll => selection.clear(),
            SelectionAction::Status => {}
        }

        let size = selection.len();
        log::debug!("selection {action} on {namespace} -> {size} selected");
        size
    }

    /// Applies a request from the wire. Unknown actions leave the selection as is.
    pub async fn apply(
        &self,
        request: &ActionRequest,
        session: &SessionContext,
        backend: &BackendContext,
    ) -> usize {
        let Some(action) = request.parsed_action() else {
            log::debug!(
                "unknown selection action {:?} on {}",
                request.action,
                request.namespace
            );
            return self.selection_len(&request.namespace);
        };
        let keys = request.present_keys();
        self.apply_action(
            &request.namespace,
            action,
            &keys,
            request.query.as_deref(),
            session,
            backend,
        )
        .await
    }

    /// Snapshot of the namespace's keys; empty if the namespace is new.
    ///
    /// The returned set is a copy and does not follow later mutations.
    pub fn get_selection(&self, namespace: &str) -> HashSet<String> {
        self.selection(namespace).snapshot()
    }

    pub fn selection_len(&self, namespace: &str) -> usize {
        self.selection(namespace).len()
    }

    pub fn is_selected(&self, namespace: &str, key: &str) -> bool {
        self.selection(namespace).contains(key)
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.read().keys().cloned().collect()
    }

    /// Adds a single key; returns whether it was new.
    pub fn add_selection(&self, namespace: &str, key: &str) -> bool {
        self.selection(namespace).insert_all([key])
    }

    /// Adds keys; returns whether the selection changed.
    pub fn add_all_selection<I, S>(&self, namespace: &str, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection(namespace).insert_all(keys)
    }

    pub fn clear(&self, namespace: &str) {
        self.selection(namespace).clear();
    }

    pub fn clear_all(&self) {
        for selection in self.namespaces.read().values() {
            selection.clear();
        }
    }

    /// Flags each item by whether its identifier is in the metadata selection.
    pub fn mark_selected<I>(&self, items: I) -> AnnotatedBatch
    where
        I: IntoIterator<Item = SelectableItem>,
    {
        self.selection(METADATA_NAMESPACE).with_keys(|keys| {
            let items = items
                .into_iter()
                .map(|item| {
                    let selected = item
                        .identifier
                        .as_deref()
                        .is_some_and(|identifier| keys.contains(identifier));
                    AnnotatedItem { item, selected }
                })
                .collect();
            AnnotatedBatch {
                items,
                selected: keys.len(),
            }
        })
    }
}

/// Session-level entry point: gets or creates the registry, then applies `request`.
pub async fn update_selection(
    session: &SessionContext,
    request: &ActionRequest,
    backend: &BackendContext,
) -> usize {
    SelectionRegistry::get_or_create(session)
        .apply(request, session, backend)
        .await
}
