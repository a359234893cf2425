//! HTTP client abstraction for outbound platform calls.
//!
//! The only outbound integration today is the Telegram Bot API, but the
//! trait keeps the notifier testable without real network requests and
//! leaves room for swapping the client implementation.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::Error;

/// A generic trait for making HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post_json(&self, url: String, body: serde_json::Value) -> Result<String, Error>;
    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DefaultHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn post_json(&self, url: String, body: serde_json::Value) -> Result<String, Error> {
        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .text()
            .await?;
        Ok(response)
    }

    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request
            .send()
            .await?
            .text()
            .await?;
        Ok(response)
    }
}
