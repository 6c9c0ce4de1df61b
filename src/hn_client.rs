use anyhow::Result;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{ItemLookup, ItemResponse, Post, SearchPage, SearchResponse};

/// Client for the Hacker News search API.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Talks to a local test server directly, ignoring any proxy settings in the environment.
    #[cfg(test)]
    pub(crate) fn without_proxy(config: &Config) -> Self {
        let client = Client::builder()
            .no_proxy()
            .timeout(config.request_timeout)
            .build()
            .unwrap();

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, query: &str, page: Option<u32>) -> String {
        let terms = encode_terms(query);
        match page {
            Some(page) => format!("{}/search?page={}&query={}", self.base_url, page, terms),
            None => format!("{}/search?query={}", self.base_url, terms),
        }
    }

    pub fn item_url(&self, id: &str) -> String {
        format!("{}/items/{}", self.base_url, urlencoding::encode(id))
    }

    /// Fetches one page of search results. `None` asks for the first page.
    pub async fn search(&self, query: &str, page: Option<u32>) -> GatewayResult<SearchPage> {
        let url = self.search_url(query, page);
        debug!(%url, "searching");

        let response = self.client.get(&url).send().await?;
        let failure = response.error_for_status_ref().err();
        let body = response.text().await?;

        if let Some(failure) = failure {
            // The API explains failures in a JSON body; prefer that over the bare status.
            if let Err(GatewayError::Api(message)) = parse_search_body(&body) {
                return Err(GatewayError::Api(message));
            }
            return Err(failure.into());
        }

        parse_search_body(&body)
    }

    pub async fn item(&self, id: &str) -> GatewayResult<ItemLookup> {
        let url = self.item_url(id);
        debug!(%url, "loading item");

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ItemLookup::NotFound);
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;

        parse_item_body(&body)
    }
}

/// Splits the query on whitespace, percent-encodes each term and joins them with `+`.
pub fn encode_terms(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| urlencoding::encode(term).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

fn error_field(value: &serde_json::Value) -> Option<String> {
    value.get("error").map(|error| match error {
        serde_json::Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

/// Decodes a search body. An `error` field is reported as [`GatewayError::Api`].
pub fn parse_search_body(body: &str) -> GatewayResult<SearchPage> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(message) = error_field(&value) {
        return Err(GatewayError::Api(message));
    }
    let response: SearchResponse = serde_json::from_value(value)?;
    Ok(SearchPage::from(response))
}

/// Decodes an item body. An `error` field means the id does not exist.
pub fn parse_item_body(body: &str) -> GatewayResult<ItemLookup> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if error_field(&value).is_some() {
        return Ok(ItemLookup::NotFound);
    }
    let item: ItemResponse = serde_json::from_value(value)?;
    Ok(ItemLookup::Found(Post::from(item)))
}
