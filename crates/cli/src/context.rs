use std::path::Path;
use std::sync::Arc;

use ranch_client::{ApiClient, ClientConfig};
use ranch_forms::FlowKind;
use ranch_session::FormSession;
use ranch_storage::{FileStore, KeyValueStore};

use crate::OutputFormat;

/// Everything a command needs: the local store, the API client, and how to
/// print.
pub(crate) struct Context {
    pub store: Arc<FileStore>,
    pub api: ApiClient,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub async fn open(
        config: Option<&Path>,
        store: &Path,
        api_url: Option<&str>,
        output: OutputFormat,
        quiet: bool,
    ) -> Result<Self, String> {
        let mut config = match config {
            Some(path) => ClientConfig::load(path).map_err(|e| e.to_string())?,
            None => ClientConfig::default(),
        };
        if let Some(url) = api_url {
            config = config.with_base_url(url);
        }
        tracing::debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "client configured");

        let store = FileStore::open(store).await.map_err(|e| e.to_string())?;
        Ok(Self {
            store: Arc::new(store),
            api: ApiClient::from_config(&config),
            output,
            quiet,
        })
    }

    pub fn kv(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn session(&self, flow: FlowKind) -> FormSession {
        FormSession::new(flow.definition(), self.store.clone(), self.api.clone())
    }

    /// Print a line of text output unless `--quiet`.
    pub fn say(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }

    /// Print a JSON document (always, regardless of `--quiet`).
    pub fn emit(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "could not render output"),
        }
    }
}
