//! Record listings for the enumerator's reports.

use ranch_client::{ApiClient, ReportKind};
use ranch_storage::KeyValueStore;
use serde_json::Value;

use crate::auth;
use crate::FlowError;

/// Fetch one listing. Nothing is cached; an expired session is torn down.
pub async fn load_report(
    store: &dyn KeyValueStore,
    api: &ApiClient,
    kind: ReportKind,
) -> Result<Vec<Value>, FlowError> {
    let token = auth::token(store).await?;
    match api.report(kind, &token).await {
        Ok(records) => {
            tracing::debug!(report = %kind, records = records.len(), "report loaded");
            Ok(records)
        }
        Err(err) => {
            tracing::warn!(report = %kind, error = %err, "report fetch failed");
            Err(auth::on_api_error(store, err).await)
        }
    }
}
