//! Credential lifecycle: login, logout, and the expired-session teardown.

use ranch_client::{ApiClient, ApiError, LoginResponse};
use ranch_forms::message::LOGIN_FIELDS_REQUIRED;
use ranch_storage::keys::{LEGACY_USER, SESSION_KEYS, USER_PROFILE, USER_TOKEN};
use ranch_storage::KeyValueStore;
use serde_json::Value;

use crate::FlowError;

/// Authenticate and store the credential and profile.
pub async fn login(
    store: &dyn KeyValueStore,
    api: &ApiClient,
    email: &str,
    password: &str,
) -> Result<LoginResponse, FlowError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(FlowError::Input(LOGIN_FIELDS_REQUIRED.to_string()));
    }
    let response = api.login(email, password).await?;
    store.set(USER_TOKEN, &response.token).await?;
    store.set(USER_PROFILE, &response.user.to_string()).await?;
    tracing::info!("login succeeded; credential stored");
    Ok(response)
}

/// Remove the credential and cached profiles. Staged payloads are kept.
pub async fn logout(store: &dyn KeyValueStore) -> Result<(), FlowError> {
    store.multi_remove(&SESSION_KEYS).await?;
    tracing::info!("logged out");
    Ok(())
}

/// Clear everything: credential, profiles, staged payloads, caches.
pub async fn teardown(store: &dyn KeyValueStore) -> Result<(), FlowError> {
    let keys = store.keys().await?;
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    store.multi_remove(&refs).await?;
    tracing::warn!(removed = refs.len(), "session expired; local session cleared");
    Ok(())
}

/// Convert an API failure into a flow failure, tearing the session down
/// first when the failure is an authentication expiry.
pub(crate) async fn on_api_error(store: &dyn KeyValueStore, err: ApiError) -> FlowError {
    if err == ApiError::AuthExpired {
        if let Err(teardown_err) = teardown(store).await {
            return teardown_err;
        }
    }
    FlowError::Api(err)
}

/// The stored bearer token, or `NotLoggedIn`.
pub async fn token(store: &dyn KeyValueStore) -> Result<String, FlowError> {
    match store.get(USER_TOKEN).await? {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(FlowError::NotLoggedIn),
    }
}

/// Token and cached profile, loaded together.
pub async fn credentials(store: &dyn KeyValueStore) -> Result<(String, Option<Value>), FlowError> {
    let (token, profile, legacy) = tokio::try_join!(
        store.get(USER_TOKEN),
        store.get(USER_PROFILE),
        store.get(LEGACY_USER),
    )?;
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(FlowError::NotLoggedIn)?;
    let profile = profile
        .or(legacy)
        .and_then(|p| serde_json::from_str::<Value>(&p).ok())
        .filter(Value::is_object);
    Ok((token, profile))
}
