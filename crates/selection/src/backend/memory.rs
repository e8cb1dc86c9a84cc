//! In-memory search backend, usable as either engine flavour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use super::{IdentifierIndex, SearchHits, SearchIndex, SearchRequest};
use crate::error::{Result, SelectionError};

#[derive(Debug)]
struct Document {
    identifier: String,
    text: String,
}

/// Documents matched by case-insensitive terms, returned in insertion order.
///
/// An empty query or `*` matches everything.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: RwLock<Vec<Document>>,
    last_request: Mutex<Option<SearchRequest>>,
    unavailable: AtomicBool,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identifier: impl Into<String>, text: impl Into<String>) {
        self.documents.write().push(Document {
            identifier: identifier.into(),
            text: text.into().to_lowercase(),
        });
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Makes every query fail with a backend error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// The last request seen by [`SearchIndex::execute`].
    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.lock().clone()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(SelectionError::Backend("memory index unavailable".to_string()));
        }
        Ok(())
    }

    fn matching(&self, query: &str, limit: usize) -> Vec<String> {
        let terms = query
            .split_whitespace()
            .filter(|term| *term != "*")
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        let documents = self.documents.read();
        let mut identifiers = documents
            .par_iter()
            .filter(|document| {
                terms.iter().all(|term| {
                    document.text.contains(term.as_str())
                        || document.identifier.to_lowercase() == *term
                })
            })
            .map(|document| document.identifier.clone())
            .collect::<Vec<_>>();
        identifiers.truncate(limit);
        identifiers
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn execute(&self, request: &SearchRequest) -> Result<Arc<dyn SearchHits>> {
        *self.last_request.lock() = Some(request.clone());
        self.ensure_available()?;
        let identifiers = self.matching(&request.query, usize::MAX);
        Ok(Arc::new(MemoryHits { identifiers }))
    }
}

#[async_trait]
impl IdentifierIndex for MemoryIndex {
    async fn matching_identifiers(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.ensure_available()?;
        Ok(self.matching(query, limit))
    }
}

/// Materialized hit list.
#[derive(Debug, Clone, Default)]
pub struct MemoryHits {
    identifiers: Vec<String>,
}

impl MemoryHits {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }
}

impl SearchHits for MemoryHits {
    fn identifiers(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self.identifiers.iter().take(limit).cloned().collect())
    }
}
