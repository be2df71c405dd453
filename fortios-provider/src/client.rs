//! FortiOS REST API client
//!
//! `RestClient` is the contract the provider dispatches CRUD calls through.
//! `HttpClient` implements it against the FortiOS CMDB API:
//!
//! ```text
//! GET    /api/v2/cmdb/<path>[/<mkey>]?vdom=<vdom>
//! POST   /api/v2/cmdb/<path>?vdom=<vdom>
//! PUT    /api/v2/cmdb/<path>[/<mkey>]?vdom=<vdom>
//! DELETE /api/v2/cmdb/<path>/<mkey>?vdom=<vdom>
//! ```

use std::time::Duration;

use async_trait::async_trait;
use fortios_core::mapper::Record;
use reqwest::{Method, StatusCode, Url};
use thiserror::Error;

use crate::config::ProviderConfig;

const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// CRUD access to configuration objects on a device
///
/// `path` is the CMDB path of the object type (e.g., "firewall/address").
/// `mkey` is `None` for singleton object types.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Create an object; the response carries the new `mkey`
    async fn create(&self, path: &str, body: Record, vdom: Option<&str>) -> ClientResult<Record>;

    /// Read an object; `None` if it does not exist
    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> ClientResult<Option<Record>>;

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: Record,
        vdom: Option<&str>,
    ) -> ClientResult<Record>;

    async fn delete(&self, path: &str, mkey: &str, vdom: Option<&str>) -> ClientResult<()>;
}

/// `RestClient` over HTTP(S)
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    retries: u32,
}

impl HttpClient {
    pub fn new(config: &ProviderConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let base = base_url(&config.hostname)?;

        Ok(Self {
            http,
            base,
            token: config.token.clone(),
            retries: config.retries,
        })
    }

    /// Build the URL of an object or object type
    pub fn endpoint(&self, path: &str, mkey: Option<&str>, vdom: Option<&str>) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["api", "v2", "cmdb"]);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(mkey) = mkey {
                segments.push(mkey);
            }
        }
        if let Some(vdom) = vdom {
            url.query_pairs_mut().append_pair("vdom", vdom);
        }
        Ok(url)
    }

    /// Send a request, retrying transport failures.
    /// Returns `None` on HTTP 404.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Record>,
    ) -> ClientResult<Option<serde_json::Value>> {
        let mut attempt = 0;
        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&self.token);
            if let Some(body) = body {
                request = request.json(body);
            }

            log::debug!("{} {}", method, url);
            match request.send().await {
                Ok(response) => return Self::handle_response(response).await,
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        "{} {} failed ({}), retrying ({}/{})",
                        method,
                        url,
                        e,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(ClientError::Transport(e.to_string())),
            }
        }
    }

    async fn handle_response(
        response: reqwest::Response,
    ) -> ClientResult<Option<serde_json::Value>> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let body = parse_body(&text)?;
        check_status(status.as_u16(), &body)?;
        Ok(Some(body))
    }
}

#[async_trait]
impl RestClient for HttpClient {
    async fn create(&self, path: &str, body: Record, vdom: Option<&str>) -> ClientResult<Record> {
        let url = self.endpoint(path, None, vdom)?;
        let response = self.send(Method::POST, url, Some(&body)).await?;
        into_record(response)
    }

    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> ClientResult<Option<Record>> {
        let url = self.endpoint(path, mkey, vdom)?;
        match self.send(Method::GET, url, None).await? {
            Some(body) => extract_result(body),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: Record,
        vdom: Option<&str>,
    ) -> ClientResult<Record> {
        let url = self.endpoint(path, mkey, vdom)?;
        let response = self.send(Method::PUT, url, Some(&body)).await?;
        into_record(response)
    }

    async fn delete(&self, path: &str, mkey: &str, vdom: Option<&str>) -> ClientResult<()> {
        let url = self.endpoint(path, Some(mkey), vdom)?;
        match self.send(Method::DELETE, url, None).await? {
            Some(_) => Ok(()),
            None => Err(ClientError::Api {
                status: 404,
                message: format!("{}/{} not found", path, mkey),
            }),
        }
    }
}

/// `fgt.local:8443` -> `https://fgt.local:8443/`. An explicit scheme is kept.
fn base_url(hostname: &str) -> ClientResult<Url> {
    let base = if hostname.contains("://") {
        format!("{}/", hostname.trim_end_matches('/'))
    } else {
        format!("https://{}/", hostname)
    };
    Url::parse(&base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", hostname, e)))
}

fn parse_body(text: &str) -> ClientResult<serde_json::Value> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Fail on non-2xx HTTP status or an `"status": "error"` envelope
fn check_status(status: u16, body: &serde_json::Value) -> ClientResult<()> {
    let envelope_error = body.get("status").and_then(|s| s.as_str()) == Some("error");
    if (200..300).contains(&status) && !envelope_error {
        return Ok(());
    }

    let status = body
        .get("http_status")
        .and_then(|s| s.as_u64())
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(status);
    let message = match (body.get("error"), body.get("cli_error")) {
        (_, Some(serde_json::Value::String(cli))) => cli.trim().to_string(),
        (Some(code), _) => format!("error code {}", code),
        _ => body.to_string(),
    };
    Err(ClientError::Api { status, message })
}

/// Unwrap the `results` of a read response.
///
/// Collections answer with a one-element array, singletons with an object.
fn extract_result(body: serde_json::Value) -> ClientResult<Option<Record>> {
    match body {
        serde_json::Value::Object(mut envelope) => match envelope.remove("results") {
            Some(serde_json::Value::Array(items)) => match items.into_iter().next() {
                Some(serde_json::Value::Object(record)) => Ok(Some(record)),
                Some(other) => Err(ClientError::InvalidResponse(format!(
                    "expected object in results, got {}",
                    other
                ))),
                None => Ok(None),
            },
            Some(serde_json::Value::Object(record)) => Ok(Some(record)),
            Some(other) => Err(ClientError::InvalidResponse(format!(
                "unexpected results: {}",
                other
            ))),
            None => Ok(Some(envelope)),
        },
        serde_json::Value::Null => Ok(None),
        other => Err(ClientError::InvalidResponse(format!(
            "expected object, got {}",
            other
        ))),
    }
}

fn into_record(body: Option<serde_json::Value>) -> ClientResult<Record> {
    match body {
        Some(serde_json::Value::Object(record)) => Ok(record),
        Some(serde_json::Value::Null) | None => Ok(Record::new()),
        Some(other) => Err(ClientError::InvalidResponse(format!(
            "expected object, got {}",
            other
        ))),
    }
}
