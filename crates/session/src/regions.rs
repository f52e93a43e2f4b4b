use ranch_client::ApiClient;
use ranch_forms::CascadeSelect;
use ranch_storage::keys::USER_TOKEN;
use ranch_storage::KeyValueStore;

use crate::auth;
use crate::FlowError;

/// Fetch the state → LGA dataset once and return a selector over it.
pub async fn load_regions(store: &dyn KeyValueStore, api: &ApiClient) -> Result<CascadeSelect, FlowError> {
    let token = store.get(USER_TOKEN).await?;
    match api.state_locals(token.as_deref()).await {
        Ok(catalog) => {
            tracing::debug!(states = catalog.len(), "reference data loaded");
            Ok(CascadeSelect::with_catalog(catalog))
        }
        Err(err) => Err(auth::on_api_error(store, err).await),
    }
}
