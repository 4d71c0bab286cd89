//! OMDb client: free-text list queries and lookups by IMDb identifier.
//!
//! OMDb reports semantic failures ("Movie not found!", "Too many results.",
//! "Invalid API key!") inside a normal JSON body with `Response: "False"`.
//! Those come back as [`Lookup::Rejected`]; only transport, HTTP status and
//! decode problems are [`CatalogError`]s.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::types::{DetailRecord, Lookup, SearchPage, SearchResultItem};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The remote movie-metadata service, as seen by the views.
pub trait MovieCatalog: Send + Sync {
    fn search(&self, term: &str) -> Result<Lookup<SearchPage>, CatalogError>;

    fn details(&self, id: &str) -> Result<Lookup<DetailRecord>, CatalogError>;
}

pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(config: &AppConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.omdb_base_url.clone(),
            api_key: config.omdb_api_key.clone(),
        })
    }

    fn get_body(&self, url: &str) -> Result<String, CatalogError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        Ok(resp.text()?)
    }
}

impl MovieCatalog for OmdbClient {
    fn search(&self, term: &str) -> Result<Lookup<SearchPage>, CatalogError> {
        debug!("OMDb search: term='{}'", term);
        let body = self.get_body(&search_url(&self.base_url, &self.api_key, term))?;
        decode_search(&body)
    }

    fn details(&self, id: &str) -> Result<Lookup<DetailRecord>, CatalogError> {
        debug!("OMDb details: id='{}'", id);
        let body = self.get_body(&detail_url(&self.base_url, &self.api_key, id))?;
        decode_detail(&body)
    }
}

// ---- URLs ----

fn with_query(base: &str, param: &str, value: &str, api_key: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{sep}{param}={}&apikey={}",
        urlencoding::encode(value),
        urlencoding::encode(api_key)
    )
}

pub fn search_url(base: &str, api_key: &str, term: &str) -> String {
    with_query(base, "s", term, api_key)
}

pub fn detail_url(base: &str, api_key: &str, id: &str) -> String {
    with_query(base, "i", id, api_key)
}

// ---- wire decoding ----

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<SearchResultItem>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

fn is_positive(response: &str) -> bool {
    response.trim().eq_ignore_ascii_case("true")
}

fn non_blank(msg: Option<String>) -> Option<String> {
    msg.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

pub fn decode_search(body: &str) -> Result<Lookup<SearchPage>, CatalogError> {
    let env: SearchEnvelope = serde_json::from_str(body)?;
    if !is_positive(&env.response) {
        return Ok(Lookup::Rejected(non_blank(env.error)));
    }
    let total_results = env
        .total_results
        .as_deref()
        .and_then(|s| s.trim().parse::<u32>().ok());
    Ok(Lookup::Found(SearchPage {
        items: env.search,
        total_results,
    }))
}

pub fn decode_detail(body: &str) -> Result<Lookup<DetailRecord>, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let status = StatusEnvelope::deserialize(&value)?;
    if !is_positive(&status.response) {
        return Ok(Lookup::Rejected(non_blank(status.error)));
    }
    Ok(Lookup::Found(DetailRecord::deserialize(value)?))
}
