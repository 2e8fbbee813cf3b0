//! reqwest-backed [`SearchGateway`] talking to the console's search API.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::fallback::default_entity_types;
use super::gateway::{GatewayError, SearchGateway};
use crate::model::types::{
    EntityType, Query, ResultItem, SearchResponse, SearchStatistics, SearchSuggestion,
};

pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
    entity_types: OnceCell<Vec<EntityType>>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder().user_agent(concat!("hwsearch/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| GatewayError::Url(format!("{base_url}: {e}")))?;
        Ok(Self {
            client,
            base_url,
            timeout,
            entity_types: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, GatewayError> {
        let raw = format!("{}{path}", self.base_url);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| GatewayError::Url(format!("{raw}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        debug!(url = %url, "search_request");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> GatewayError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => GatewayError::Timeout(timeout),
            _ => GatewayError::Transport(err),
        }
    }

    /// Entity types, or the static catalog when the service cannot answer.
    pub async fn entity_types_or_default(&self) -> Vec<EntityType> {
        match self.entity_types().await {
            Ok(types) if !types.is_empty() => types,
            Ok(_) => default_entity_types(),
            Err(e) => {
                warn!("entity types unavailable, using built-in catalog: {e}");
                default_entity_types()
            }
        }
    }

    pub async fn suggestions(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<SearchSuggestion>, GatewayError> {
        let url = self.endpoint(
            "/api/search/suggestions",
            &[("q", text.to_string()), ("limit", limit.to_string())],
        )?;
        self.get_json(url).await
    }

    pub async fn statistics(&self) -> Result<SearchStatistics, GatewayError> {
        let url = self.endpoint("/api/search/statistics", &[])?;
        self.get_json(url).await
    }
}

impl SearchGateway for HttpGateway {
    async fn search(&self, query: &Query) -> Result<SearchResponse, GatewayError> {
        let url = self.endpoint("/api/search", &query.filters.to_params(&query.text))?;
        let response: SearchResponse = self.get_json(url).await?;
        if !response.is_success {
            return Err(GatewayError::Rejected(
                response
                    .error_message
                    .unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }
        Ok(response)
    }

    async fn quick_search(&self, text: &str, limit: usize) -> Result<Vec<ResultItem>, GatewayError> {
        let url = self.endpoint(
            "/api/search/quick",
            &[("q", text.to_string()), ("limit", limit.to_string())],
        )?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.results)
    }

    async fn entity_types(&self) -> Result<Vec<EntityType>, GatewayError> {
        let types = self
            .entity_types
            .get_or_try_init(|| async {
                let url = self.endpoint("/api/search/entity-types", &[])?;
                self.get_json::<Vec<EntityType>>(url).await
            })
            .await?;
        Ok(types.clone())
    }
}
