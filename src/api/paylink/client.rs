use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{ApiError, TransactionDetail, TransactionSummary};
use crate::api::TransactionSource;
use crate::config::SyncConfig;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Payment API client for listing transactions and fetching their detail
pub struct PaylinkClient {
    http_client: HttpClient,
    link_api: String,
    headers: HeaderMap,
}

impl PaylinkClient {
    /// Create a client from the loaded configuration
    ///
    /// A single HTTP client is built here and reused for every call.
    pub fn new(config: &SyncConfig) -> Result<Self, ApiError> {
        let headers = Self::create_headers(&config.authentication_api, &config.authentication_key)?;

        let http_client = HttpClient::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            link_api: config.link_api.clone(),
            headers,
        })
    }

    /// Create the credential headers sent with every request
    fn create_headers(api_id: &str, api_key: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_value = HeaderValue::from_str(api_id).map_err(|e| ApiError::InvalidHeader {
            name: "authenticationApi",
            reason: e.to_string(),
        })?;
        headers.insert(HeaderName::from_static("authenticationapi"), api_value);

        let key_value = HeaderValue::from_str(api_key).map_err(|e| ApiError::InvalidHeader {
            name: "authenticationKey",
            reason: e.to_string(),
        })?;
        headers.insert(HeaderName::from_static("authenticationkey"), key_value);

        Ok(headers)
    }

    /// `<LinkAPI><referenceId>`, no separator
    pub fn list_url(&self, reference_id: &str) -> String {
        format!("{}{}", self.link_api, reference_id)
    }

    /// `<LinkAPI>/<transactionId>`
    pub fn detail_url(&self, transaction_id: &str) -> String {
        format!("{}/{}", self.link_api, transaction_id)
    }

    /// Issue one GET and decode the body
    ///
    /// The body is always read to the end before decoding so the pooled
    /// connection can be reused regardless of the decode outcome.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {}", url);

        let response = self.http_client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body_preview(&body),
            });
        }

        decode_body(&body)
    }
}

#[async_trait]
impl TransactionSource for PaylinkClient {
    /// GET `<LinkAPI><referenceId>`
    ///
    /// Returns every transaction the upstream currently lists for the reference.
    async fn list_transactions(
        &self,
        reference_id: &str,
    ) -> Result<Vec<TransactionSummary>, ApiError> {
        let url = self.list_url(reference_id);
        self.get_json::<Vec<TransactionSummary>>(&url).await
    }

    /// GET `<LinkAPI>/<transactionId>`
    async fn fetch_detail(&self, transaction_id: &str) -> Result<TransactionDetail, ApiError> {
        let url = self.detail_url(transaction_id);
        self.get_json::<TransactionDetail>(&url).await
    }
}

/// Decode a fully-read response body
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice::<T>(body)
        .map_err(|e| ApiError::Decode(format!("Failed to parse response: {}", e)))
}

fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}
