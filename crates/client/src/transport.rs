//! The transport seam between the client and the network.
//!
//! [`RemoteApi`] sends one request and returns the raw status and body
//! text; interpreting the body is the client's job. [`HttpTransport`] is the
//! production implementation. Uses `ureq` (sync) inside
//! `tokio::task::spawn_blocking` so the async runtime is never blocked.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use ranch_forms::MediaAttachment;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::multipart;
use crate::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Text fields plus file references; files are read when encoding.
    Multipart {
        fields: BTreeMap<String, String>,
        files: Vec<MediaAttachment>,
    },
}

/// One outgoing request, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Bearer credential, without the `Bearer ` prefix.
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: &str, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            bearer: None,
            body,
        }
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(|t| t.strip_prefix("Bearer ").unwrap_or(t).to_string());
        self
    }
}

/// Status code and undecoded body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the remote API.
///
/// Implementations report only transport-level failures (timeout, network,
/// unreadable attachment). Any HTTP status, including 4xx/5xx, is a
/// successful send.
#[async_trait]
pub trait RemoteApi: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

/// [`RemoteApi`] over HTTPS with a global per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteApi for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let agent = self.agent.clone();
        let url = format!("{}{}", self.base_url, request.path);

        tokio::task::spawn_blocking(move || send_blocking(&agent, &url, request))
            .await
            .map_err(|e| ApiError::Network(format!("task join error: {}", e)))?
    }
}

fn send_blocking(agent: &ureq::Agent, url: &str, request: ApiRequest) -> Result<RawResponse, ApiError> {
    let auth = request.bearer.as_ref().map(|t| format!("Bearer {}", t));

    let result = match request.method {
        Method::Get => {
            let mut req = agent.get(url).header("Accept", "application/json");
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth);
            }
            req.call()
        }
        Method::Post => {
            let mut req = agent.post(url).header("Accept", "application/json");
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth);
            }
            match request.body {
                RequestBody::Empty => req.send_empty(),
                RequestBody::Json(value) => req.send_json(&value),
                RequestBody::Multipart { fields, files } => {
                    let form = multipart::encode(&fields, &files)?;
                    req.header("Content-Type", &form.content_type)
                        .send(&form.body[..])
                }
            }
        }
    };

    let response = result.map_err(classify_error)?;
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .read_to_string()
        .map_err(classify_error)?;
    Ok(RawResponse { status, body })
}

/// Separate timeouts from every other transport failure.
fn classify_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => ApiError::Timeout,
        other => ApiError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_not_doubled() {
        let req = ApiRequest::get("/x").bearer(Some("Bearer abc"));
        assert_eq!(req.bearer.as_deref(), Some("abc"));
        let req = ApiRequest::get("/x").bearer(Some("abc"));
        assert_eq!(req.bearer.as_deref(), Some("abc"));
    }

    #[test]
    fn success_range() {
        assert!(RawResponse::new(201, "").is_success());
        assert!(!RawResponse::new(302, "").is_success());
        assert!(!RawResponse::new(422, "").is_success());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let transport = HttpTransport::with_timeout("http://127.0.0.1:9", Duration::from_secs(2));
        let err = transport.send(ApiRequest::get("/")).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "{err:?}");
    }
}
