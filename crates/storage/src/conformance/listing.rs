use std::future::Future;

use super::TestResult;
use crate::KeyValueStore;

pub(super) async fn run_listing_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "listing",
            "keys_empty_on_fresh_store",
            keys_empty_on_fresh_store(factory).await,
        ),
        TestResult::from_result(
            "listing",
            "keys_sorted_and_deduplicated",
            keys_sorted_and_deduplicated(factory).await,
        ),
    ]
}

async fn keys_empty_on_fresh_store<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let keys = s.keys().await.map_err(|e| e.to_string())?;
    if !keys.is_empty() {
        return Err(format!("expected no keys, got {:?}", keys));
    }
    Ok(())
}

async fn keys_sorted_and_deduplicated<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for key in ["userToken", "dashboardSummary", "userToken", "livestockKeeperStep1"] {
        s.set(key, "v").await.map_err(|e| e.to_string())?;
    }
    let keys = s.keys().await.map_err(|e| e.to_string())?;
    let expected = vec![
        "dashboardSummary".to_string(),
        "livestockKeeperStep1".to_string(),
        "userToken".to_string(),
    ];
    if keys != expected {
        return Err(format!("expected {:?}, got {:?}", expected, keys));
    }
    Ok(())
}
