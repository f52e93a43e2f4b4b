//! HTTP client for the livestock registration API.
//!
//! - [`config`] — base URL, timeout and endpoint paths (TOML)
//! - [`transport`] — the [`RemoteApi`] seam and its ureq implementation
//! - [`multipart`] — `multipart/form-data` encoding for media uploads
//! - [`response`] — status/body interpretation into [`ApiError`]s
//! - [`client`] — typed operations (login, reference data, submit, dashboard)

pub mod client;
pub mod config;
mod error;
pub mod multipart;
pub mod response;
pub mod transport;

pub use client::{ApiClient, DashboardSources, LoginResponse};
pub use config::{ClientConfig, ConfigError, Endpoints, ReportKind};
pub use error::ApiError;
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, RemoteApi, RequestBody};
