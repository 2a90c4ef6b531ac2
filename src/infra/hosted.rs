//! HTTP context shared by the hosted store and auth adapters.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;

use super::error::InfraError;

/// Base URL, anon key and a configured client for the hosted backend.
#[derive(Clone, Debug)]
pub struct HostedCtx {
    client: Client,
    base: Url,
    anon_key: String,
}

impl HostedCtx {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, InfraError> {
        let base = Url::parse(base_url)
            .and_then(|url| url.join("/"))
            .map_err(|err| InfraError::configuration(format!("invalid backend url: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            anon_key: anon_key.to_string(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blogcraft/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path)
    }

    /// Request with `apikey` set and a bearer of the user token, or the anon key.
    pub fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }
}

/// Error body returned by the hosted REST layer.
#[derive(Debug, Default, Deserialize)]
pub struct HostedErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "msg", alias = "error_description")]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl HostedErrorBody {
    /// Parse an error body, falling back to the raw text as the message.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|_| Self {
            message: Some(String::from_utf8_lossy(bytes).trim().to_string())
                .filter(|text| !text.is_empty()),
            ..Self::default()
        })
    }

    pub fn describe(&self, status: reqwest::StatusCode) -> String {
        match (&self.message, &self.details) {
            (Some(message), Some(details)) => format!("{message} ({details})"),
            (Some(message), None) => message.clone(),
            (None, _) => format!("request failed with status {status}"),
        }
    }
}
