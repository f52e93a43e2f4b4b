use std::future::Future;

use super::TestResult;
use crate::KeyValueStore;

pub(super) async fn run_removal_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "removal",
        "remove_deletes_key",
        remove_deletes_key(factory).await,
    ));
    results.push(TestResult::from_result(
        "removal",
        "remove_absent_is_ok",
        remove_absent_is_ok(factory).await,
    ));
    results.push(TestResult::from_result(
        "removal",
        "multi_remove_deletes_exactly_listed_keys",
        multi_remove_deletes_exactly_listed_keys(factory).await,
    ));
    results.push(TestResult::from_result(
        "removal",
        "multi_remove_empty_list_is_noop",
        multi_remove_empty_list_is_noop(factory).await,
    ));

    results
}

async fn remove_deletes_key<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.set("tagScan", "{}").await.map_err(|e| e.to_string())?;
    s.remove("tagScan").await.map_err(|e| e.to_string())?;
    match s.get("tagScan").await.map_err(|e| e.to_string())? {
        None => Ok(()),
        Some(v) => Err(format!("expected key removed, still holds {:?}", v)),
    }
}

async fn remove_absent_is_ok<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.remove("never-written").await.map_err(|e| e.to_string())
}

/// Removing one flow's keys leaves another flow's staged keys in place.
async fn multi_remove_deletes_exactly_listed_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for key in ["tagScan", "tagLivestockData", "livestockOwnerStep1", "userToken"] {
        s.set(key, "v").await.map_err(|e| e.to_string())?;
    }
    s.multi_remove(&["tagScan", "tagLivestockData", "absent"])
        .await
        .map_err(|e| e.to_string())?;

    let keys = s.keys().await.map_err(|e| e.to_string())?;
    let expected = vec!["livestockOwnerStep1".to_string(), "userToken".to_string()];
    if keys != expected {
        return Err(format!("expected {:?}, got {:?}", expected, keys));
    }
    Ok(())
}

async fn multi_remove_empty_list_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.set("userToken", "tok").await.map_err(|e| e.to_string())?;
    s.multi_remove(&[]).await.map_err(|e| e.to_string())?;
    let keys = s.keys().await.map_err(|e| e.to_string())?;
    if keys.len() != 1 {
        return Err(format!("expected one key, got {:?}", keys));
    }
    Ok(())
}
