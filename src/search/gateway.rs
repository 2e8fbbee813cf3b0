//! Boundary to the remote search service.
//!
//! The gateway owns no state about the current query; it issues one request
//! and hands back either a normalized payload or a [`GatewayError`]. Recovery
//! from failures belongs to the pipeline.

use std::future::Future;
use std::time::Duration;

use crate::model::types::{EntityType, Query, ResultItem, SearchResponse};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search service returned HTTP {0}")]
    Status(u16),

    #[error("could not decode search response: {0}")]
    Decode(String),

    #[error("search service rejected the query: {0}")]
    Rejected(String),

    #[error("search request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid search url: {0}")]
    Url(String),
}

/// Remote search operations consumed by the pipeline.
///
/// Futures must be `Send` so in-flight calls can run as tasks that the
/// pipeline aborts on supersession.
pub trait SearchGateway: Send + Sync + 'static {
    /// Full search with filters, facets and paging metadata.
    fn search(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<SearchResponse, GatewayError>> + Send;

    /// Lightweight autocomplete search: items only.
    fn quick_search(
        &self,
        text: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ResultItem>, GatewayError>> + Send;

    /// Catalog of searchable categories.
    fn entity_types(&self) -> impl Future<Output = Result<Vec<EntityType>, GatewayError>> + Send;
}
