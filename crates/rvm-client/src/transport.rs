//! HTTP transport for opaque encoded payloads
//!
//! Every exchange is a POST of the opaque payload to one of the fixed
//! endpoint paths. Cookies received on any response are replayed on the
//! next request within the same client instance.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use rvm_core::Endpoint;

use crate::config::{ConnectionConfig, TimeoutsConfig};
use crate::error::{Result, RvmClientError};

/// Transport boundary: POSTs opaque payloads, persists cookies, surfaces
/// HTTP-level failures
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(connection: &ConnectionConfig, timeouts: &TimeoutsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_str(&connection.accept_language)
                .map_err(|e| RvmClientError::Config(format!("invalid Accept-Language: {e}")))?,
        );

        let client = Client::builder()
            .user_agent(&connection.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_millis(timeouts.request_ms))
            .connect_timeout(Duration::from_millis(timeouts.connect_ms))
            .build()?;

        let base_url = Url::parse(&connection.base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST an opaque payload to a command endpoint and return the response
    /// payload.
    ///
    /// Connectivity failures and non-2xx statuses are fatal to the call and
    /// propagate unrecovered.
    #[instrument(skip(self, payload))]
    pub async fn send(&self, endpoint: Endpoint, payload: String) -> Result<String> {
        let url = self.base_url.join(endpoint.path())?;
        debug!(%url, bytes = payload.len(), "sending payload");

        let response = self
            .client
            .post(url)
            .body(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
