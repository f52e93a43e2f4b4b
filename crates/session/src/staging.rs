//! Reading and writing step payloads in the key-value store.

use ranch_forms::StepPayload;
use ranch_storage::KeyValueStore;

use crate::FlowError;

/// Write `payload` under its session key, replacing any earlier value.
pub async fn save(store: &dyn KeyValueStore, payload: &StepPayload) -> Result<(), FlowError> {
    let json = payload.to_json().map_err(|e| FlowError::CorruptPayload {
        key: payload.session_key.clone(),
        message: e.to_string(),
    })?;
    store.set(&payload.session_key, &json).await?;
    Ok(())
}

/// Read the payload staged under `key`, if any.
pub async fn load(store: &dyn KeyValueStore, key: &str) -> Result<Option<StepPayload>, FlowError> {
    let Some(text) = store.get(key).await? else {
        return Ok(None);
    };
    StepPayload::from_json(&text)
        .map(Some)
        .map_err(|e| FlowError::CorruptPayload {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// One staged payload as listed by [`staged_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub key: String,
    pub created_at: String,
    pub field_count: usize,
}

/// Every staged payload in the store, whichever flow wrote it.
///
/// Values that are not step payloads (credential, profile, caches) are
/// skipped.
pub async fn staged_entries(store: &dyn KeyValueStore) -> Result<Vec<StagedEntry>, FlowError> {
    let mut entries = Vec::new();
    for key in store.keys().await? {
        let Some(text) = store.get(&key).await? else {
            continue;
        };
        if let Ok(payload) = StepPayload::from_json(&text) {
            entries.push(StagedEntry {
                key,
                created_at: payload.created_at,
                field_count: payload.fields.len(),
            });
        }
    }
    Ok(entries)
}
