//! Async HTTP client for a whatsorder-server.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::Value;
use whatsorder_codec::link;

/// Connection settings for the form server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:        String,
  /// Caller uid sent in `identity_header`; empty means anonymous.
  pub uid:             String,
  pub identity_header: String,
}

/// Which form to resolve, as carried in a share link.
#[derive(Debug, Clone, Default)]
pub struct FormQuery {
  pub id:       Option<String>,
  pub slug:     Option<String>,
  pub biz:      Option<String>,
  pub phone:    Option<String>,
  /// Encoded product list, sent as-is.
  pub products: Option<String>,
  pub edit:     bool,
}

impl FormQuery {
  /// The query string, with the product list appended without re-encoding.
  pub fn to_query(&self) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for (key, value) in [
      ("id", &self.id),
      ("slug", &self.slug),
      ("biz", &self.biz),
      ("phone", &self.phone),
    ] {
      if let Some(v) = value {
        pairs.push((key, v.as_str()));
      }
    }
    if self.edit {
      pairs.push(("mode", "edit"));
    }

    let mut query = link::query_string(&pairs);
    if let Some(products) = &self.products {
      if !query.is_empty() {
        query.push('&');
      }
      query.push_str("products=");
      query.push_str(products);
    }
    query
  }
}

#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String { link::absolute(&self.config.base_url, path) }

  fn identify(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.uid.is_empty() {
      req
    } else {
      req.header(self.config.identity_header.as_str(), self.config.uid.as_str())
    }
  }

  /// `GET /forms/resolve?...`
  pub async fn resolve(&self, query: &FormQuery) -> Result<Value> {
    let url = format!("{}?{}", self.url("/forms/resolve"), query.to_query());
    let resp = self
      .identify(self.client.get(url))
      .send()
      .await
      .context("GET /forms/resolve failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /forms/resolve → {}", resp.status()));
    }
    resp.json().await.context("deserialising resolved form")
  }

  /// `GET /forms`
  pub async fn list(&self) -> Result<Value> {
    let resp = self
      .identify(self.client.get(self.url("/forms")))
      .send()
      .await
      .context("GET /forms failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /forms → {}", resp.status()));
    }
    resp.json().await.context("deserialising forms")
  }
}
