//! Typed operations over a [`RemoteApi`].

use std::sync::Arc;

use ranch_forms::message::{INVALID_LOGIN, UNDECODABLE_RESPONSE};
use ranch_forms::normalize::normalize_records;
use ranch_forms::{MergedRecord, RegionCatalog};
use serde_json::{json, Value};

use crate::config::{ClientConfig, Endpoints, ReportKind};
use crate::response::{decode_body, interpret};
use crate::transport::{ApiRequest, HttpTransport, RemoteApi, RequestBody};
use crate::ApiError;

/// A successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: Value,
}

/// The three dashboard sources, already normalized to record lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSources {
    pub owners: Vec<Value>,
    pub keepers: Vec<Value>,
    pub tagged: Vec<Value>,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn RemoteApi>,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn RemoteApi>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// A client over HTTPS as described by `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(HttpTransport::new(config)),
            config.endpoints.clone(),
        )
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let path = request.path.clone();
        let raw = self.transport.send(request).await.inspect_err(|e| {
            tracing::warn!(path = %path, error = %e, "request failed before a response");
        })?;
        tracing::debug!(path = %path, status = raw.status, "response received");
        interpret(&raw)
    }

    /// Exchange credentials for a bearer token and the user profile.
    ///
    /// Any failing status here means bad credentials, not an expired session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(
            &self.endpoints.auth,
            RequestBody::Json(json!({
                "useremail": email,
                "password": password,
                "type": "ENUMERATOR",
            })),
        );
        let raw = self.transport.send(request).await?;
        let body = decode_body(&raw.body)?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match token {
            Some(token) if raw.is_success() => Ok(LoginResponse {
                token: token.to_string(),
                user: body.get("user").cloned().unwrap_or(Value::Null),
            }),
            _ => Err(ApiError::Rejected {
                status: raw.status,
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(INVALID_LOGIN)
                    .to_string(),
            }),
        }
    }

    /// Fetch the full state → LGA reference dataset.
    pub async fn state_locals(&self, token: Option<&str>) -> Result<RegionCatalog, ApiError> {
        let body = self
            .call(ApiRequest::get(&self.endpoints.state_locals).bearer(token))
            .await?;
        RegionCatalog::from_response(&body).map_err(|e| ApiError::Shape(e.to_string()))
    }

    /// Send a merged record to its create endpoint.
    ///
    /// Multipart when the record has attachments, JSON otherwise.
    pub async fn submit(&self, record: &MergedRecord, token: &str) -> Result<Value, ApiError> {
        let path = self.endpoints.path_for(&record.endpoint);
        let body = if record.is_multipart() {
            RequestBody::Multipart {
                fields: record.fields.clone(),
                files: record.attachments.clone(),
            }
        } else {
            RequestBody::Json(record.to_json())
        };
        tracing::info!(
            path = %path,
            fields = record.fields.len(),
            attachments = record.attachments.len(),
            "submitting record"
        );
        self.call(ApiRequest::post(&path, body).bearer(Some(token)))
            .await
    }

    /// Fetch a listing endpoint and normalize it to a record list.
    pub async fn fetch_records(&self, path: &str, token: &str) -> Result<Vec<Value>, ApiError> {
        let body = self.call(ApiRequest::get(path).bearer(Some(token))).await?;
        normalize_records(&body).ok_or_else(|| ApiError::Shape(UNDECODABLE_RESPONSE.to_string()))
    }

    pub async fn report(&self, kind: ReportKind, token: &str) -> Result<Vec<Value>, ApiError> {
        self.fetch_records(self.endpoints.report_path(kind), token).await
    }

    /// Fetch the three dashboard sources together; any failure fails all.
    pub async fn dashboard_sources(&self, token: &str) -> Result<DashboardSources, ApiError> {
        let (owners, keepers, tagged) = tokio::try_join!(
            self.fetch_records(&self.endpoints.owners, token),
            self.fetch_records(&self.endpoints.keepers, token),
            self.fetch_records(&self.endpoints.tagged, token),
        )?;
        Ok(DashboardSources {
            owners,
            keepers,
            tagged,
        })
    }
}
