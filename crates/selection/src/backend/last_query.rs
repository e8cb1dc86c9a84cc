use std::sync::Arc;

use async_trait::async_trait;

use super::{explicit_query, BulkUuidResolver, SearchIndex, SearchRequest};
use crate::error::Result;
use crate::session::SessionSearchState;

/// Resolver for the legacy single-process engine.
///
/// Runs the explicit query when given, otherwise re-runs the session's last
/// search, otherwise reads the session's cached hits.
pub struct LastQueryResolver {
    index: Arc<dyn SearchIndex>,
}

impl LastQueryResolver {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl BulkUuidResolver for LastQueryResolver {
    fn name(&self) -> &'static str {
        "last-query"
    }

    async fn resolve(
        &self,
        search: &SessionSearchState,
        query: Option<&str>,
        max_hits: usize,
    ) -> Result<Vec<String>> {
        let request = match explicit_query(query) {
            Some(query) => Some(SearchRequest::new(query)),
            None => search.last_request(),
        };

        if let Some(mut request) = request {
            // Summaries are never rendered for a bulk selection.
            request.build_summary = false;
            let hits = self.index.execute(&request).await?;
            return hits.identifiers(max_hits);
        }

        match search.cached_hits() {
            Some(hits) => hits.identifiers(max_hits),
            None => {
                log::debug!("no stored search for session, nothing to select");
                Ok(Vec::new())
            }
        }
    }
}
