//! Client configuration loaded from TOML.
//!
//! ```toml
//! base_url = "https://api.ranchid.app"
//! timeout_secs = 30
//!
//! [endpoints]
//! tag_livestock = "/api/enumerator/tag_livestock"
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ranch_forms::Endpoint;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.ranchid.app";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config '{path}': {message}")]
    Io { path: String, message: String },
    #[error("invalid config '{path}': {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

/// Endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub auth: String,
    pub state_locals: String,
    pub add_keeper: String,
    pub add_owner: String,
    pub add_location: String,
    pub tag_livestock: String,
    pub owners: String,
    pub keepers: String,
    pub tagged: String,
    pub keeper_list: String,
    pub location_list: String,
    pub tagged_list: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: "/api/auth".to_string(),
            state_locals: "/api/state_locals".to_string(),
            add_keeper: Endpoint::AddKeeper.default_path().to_string(),
            add_owner: Endpoint::AddOwner.default_path().to_string(),
            add_location: Endpoint::AddLocation.default_path().to_string(),
            tag_livestock: Endpoint::TagLivestock.default_path().to_string(),
            owners: "/api/enumerator/get_livestock_owners".to_string(),
            keepers: "/api/enumerator/get_livestock_keepers".to_string(),
            tagged: "/api/dashboard/all_tagged_livestock".to_string(),
            keeper_list: "/api/enumerator/list_livestock_keepers".to_string(),
            location_list: "/api/enumerator/list_locations".to_string(),
            tagged_list: "/api/enumerator/list_tagged_livestock".to_string(),
        }
    }
}

impl Endpoints {
    /// The configured path for a create endpoint.
    pub fn path_for(&self, endpoint: &Endpoint) -> String {
        match endpoint {
            Endpoint::AddKeeper => self.add_keeper.clone(),
            Endpoint::AddOwner => self.add_owner.clone(),
            Endpoint::AddLocation => self.add_location.clone(),
            Endpoint::TagLivestock => self.tag_livestock.clone(),
            Endpoint::Custom(path) => path.clone(),
        }
    }

    /// The listing path behind a report. Owners share the dashboard source.
    pub fn report_path(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::Keepers => &self.keeper_list,
            ReportKind::Owners => &self.owners,
            ReportKind::Locations => &self.location_list,
            ReportKind::Tagged => &self.tagged_list,
        }
    }
}

/// A record listing the enumerator can browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Keepers,
    Owners,
    Locations,
    Tagged,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Keepers,
        ReportKind::Owners,
        ReportKind::Locations,
        ReportKind::Tagged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Keepers => "keepers",
            ReportKind::Owners => "owners",
            ReportKind::Locations => "locations",
            ReportKind::Tagged => "tagged",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown report '{s}' (expected keepers, owners, locations, or tagged)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        assert_eq!(ClientConfig::from_toml_str("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = ClientConfig::from_toml_str(
            r#"
timeout_secs = 5

[endpoints]
tag_livestock = "/api/v2/tags"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.endpoints.path_for(&Endpoint::TagLivestock), "/api/v2/tags");
        assert_eq!(
            config.endpoints.path_for(&Endpoint::AddOwner),
            "/api/enumerator/add_livestock_owner"
        );
    }

    #[test]
    fn report_paths_follow_overrides() {
        let config = ClientConfig::from_toml_str(
            r#"
[endpoints]
location_list = "/api/v2/locations"
"#,
        )
        .unwrap();
        let endpoints = &config.endpoints;
        assert_eq!(endpoints.report_path(ReportKind::Locations), "/api/v2/locations");
        assert_eq!(
            endpoints.report_path(ReportKind::Keepers),
            "/api/enumerator/list_livestock_keepers"
        );
        assert_eq!(endpoints.report_path(ReportKind::Owners), endpoints.owners);
        assert_eq!("Tagged".parse::<ReportKind>(), Ok(ReportKind::Tagged));
        assert!("herds".parse::<ReportKind>().is_err());
    }

    #[test]
    fn bad_toml_is_reported_with_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ranch.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }
}
