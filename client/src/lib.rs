//! Authenticated HTTP access to the item storage API.
//!
//! # Architecture
//!
//! [`ApiClient`] bundles a hardened [`reqwest::Client`], the two [`Endpoints`]
//! and the caller's [`BearerToken`]. It performs exactly two kinds of calls:
//!
//! - [`ApiClient::fetch_records`] - one `GET` of the whole item collection
//! - [`ApiClient::incinerate`] - one `PUT` per item to destroy
//!
//! Neither call retries. Every non-2xx status is reported as
//! [`TransportError::Status`] with a capped copy of the response body.

mod error;

pub use error::{DecodeError, FetchError, TransportError};

use std::time::Duration;

use incinerator_types::{BearerToken, ItemId, Record};
use reqwest::Response;
use serde::Serialize;
use url::Url;

/// Storage listing used by the game's bank page.
pub const DEFAULT_FETCH_URL: &str = "https://api.theremnants.app/bank/storage?search=";
/// Incineration endpoint; takes one item id per call.
pub const DEFAULT_DISPATCH_URL: &str = "https://api.theremnants.app/item/incinerate";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// reqwest only exposes tcp_keepalive (idle time); interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Transport knobs for [`build_http_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    /// Upper bound for a whole request, body included.
    pub request_timeout: Duration,
    /// Permit plain `http://` endpoints. Only local mock servers need this.
    pub allow_insecure_http: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            allow_insecure_http: false,
        }
    }
}

pub fn build_http_client(settings: &HttpSettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .https_only(!settings.allow_insecure_http)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .build()
}

/// Where to read the collection from and where to send incineration requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub fetch: Url,
    pub dispatch: Url,
}

impl Endpoints {
    pub fn parse(fetch: &str, dispatch: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            fetch: Url::parse(fetch)?,
            dispatch: Url::parse(dispatch)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct IncinerateRequest<'a> {
    #[serde(rename = "itemToIncinerateId")]
    item_to_incinerate_id: &'a str,
}

/// Client for the storage API. Cheap to share behind an `Arc`; holds no
/// mutable state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    token: BearerToken,
}

impl ApiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoints: Endpoints, token: BearerToken) -> Self {
        Self {
            http,
            endpoints,
            token,
        }
    }

    pub fn from_settings(
        settings: &HttpSettings,
        endpoints: Endpoints,
        token: BearerToken,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(settings)?, endpoints, token))
    }

    /// Fetch the full item collection.
    ///
    /// The whole body is buffered before decoding; there is no pagination.
    pub async fn fetch_records(&self) -> Result<Vec<Record>, FetchError> {
        let url = &self.endpoints.fetch;
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let response = ensure_success(response, url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })?;

        let records: Vec<Record> =
            serde_json::from_slice(&body).map_err(|source| DecodeError {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!(
            records = records.len(),
            body_bytes = body.len(),
            "Fetched item collection"
        );
        Ok(records)
    }

    /// Ask the server to incinerate one item.
    ///
    /// Success means a 2xx status; the response body is discarded.
    pub async fn incinerate(&self, id: &ItemId) -> Result<(), TransportError> {
        let url = &self.endpoints.dispatch;
        let payload = IncinerateRequest {
            item_to_incinerate_id: id.as_str(),
        };
        let response = self
            .http
            .put(url.clone())
            .bearer_auth(self.token.expose())
            .json(&payload)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        // Dropping the response releases the connection without reading the body.
        let status = ensure_success(response, url).await?.status();
        tracing::debug!(item_id = %id, %status, "Incinerated item");
        Ok(())
    }
}

async fn ensure_success(response: Response, url: &Url) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_capped_error_body(response).await;
    Err(TransportError::Status {
        url: url.to_string(),
        status,
        body,
    })
}

pub async fn read_capped_error_body(response: Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
