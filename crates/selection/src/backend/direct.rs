use std::sync::Arc;

use async_trait::async_trait;

use super::{explicit_query, BulkUuidResolver, IdentifierIndex};
use crate::error::Result;
use crate::session::SessionSearchState;

/// Resolver for the distributed index service.
///
/// Without an explicit query it falls back to the query of the session's
/// last search, the same order [`super::LastQueryResolver`] follows. Only the
/// query text is forwarded: [`IdentifierIndex`] takes no parameters, so the
/// stored request's `params` (filters, sort) do not apply here.
pub struct DirectQueryResolver {
    index: Arc<dyn IdentifierIndex>,
}

impl DirectQueryResolver {
    pub fn new(index: Arc<dyn IdentifierIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl BulkUuidResolver for DirectQueryResolver {
    fn name(&self) -> &'static str {
        "direct-query"
    }

    async fn resolve(
        &self,
        search: &SessionSearchState,
        query: Option<&str>,
        max_hits: usize,
    ) -> Result<Vec<String>> {
        let query = match explicit_query(query) {
            Some(query) => query.to_string(),
            None => match search.last_request() {
                Some(request) => request.query,
                None => {
                    log::debug!("no query supplied or stored, nothing to select");
                    return Ok(Vec::new());
                }
            },
        };
        self.index.matching_identifiers(&query, max_hits).await
    }
}
