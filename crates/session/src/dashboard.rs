//! Dashboard summary with an offline fallback.

use ranch_client::ApiClient;
use ranch_forms::DashboardSummary;
use ranch_storage::keys::DASHBOARD_SUMMARY;
use ranch_storage::KeyValueStore;
use time::OffsetDateTime;

use crate::auth;
use crate::FlowError;

/// Fetch the three sources, count them, and cache the result.
///
/// If the fetch fails for any reason other than an expired session, the
/// last cached summary is returned with `stale` set. With no cache the
/// failure is returned.
pub async fn load_dashboard(
    store: &dyn KeyValueStore,
    api: &ApiClient,
    now: OffsetDateTime,
) -> Result<DashboardSummary, FlowError> {
    let token = auth::token(store).await?;

    match api.dashboard_sources(&token).await {
        Ok(sources) => {
            let summary =
                DashboardSummary::summarize(&sources.owners, &sources.keepers, &sources.tagged, now);
            match summary.to_json() {
                Ok(json) => store.set(DASHBOARD_SUMMARY, &json).await?,
                Err(e) => tracing::warn!(error = %e, "dashboard summary not cached"),
            }
            Ok(summary)
        }
        Err(err) if err == ranch_client::ApiError::AuthExpired => {
            Err(auth::on_api_error(store, err).await)
        }
        Err(err) => match cached(store).await? {
            Some(mut summary) => {
                tracing::warn!(error = %err, "dashboard fetch failed; serving cached summary");
                summary.stale = true;
                Ok(summary)
            }
            None => Err(FlowError::Api(err)),
        },
    }
}

async fn cached(store: &dyn KeyValueStore) -> Result<Option<DashboardSummary>, FlowError> {
    Ok(store
        .get(DASHBOARD_SUMMARY)
        .await?
        .and_then(|text| DashboardSummary::from_json(&text).ok()))
}
