use std::future::Future;

use super::{sample_payload, TestResult};
use crate::KeyValueStore;

pub(super) async fn run_roundtrip_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "roundtrip",
        "set_then_get_is_identical",
        set_then_get_is_identical(factory).await,
    ));
    results.push(TestResult::from_result(
        "roundtrip",
        "get_absent_is_none",
        get_absent_is_none(factory).await,
    ));
    results.push(TestResult::from_result(
        "roundtrip",
        "unicode_and_whitespace_preserved",
        unicode_and_whitespace_preserved(factory).await,
    ));
    results.push(TestResult::from_result(
        "overwrite",
        "set_replaces_previous_value",
        set_replaces_previous_value(factory).await,
    ));
    results.push(TestResult::from_result(
        "overwrite",
        "set_does_not_touch_other_keys",
        set_does_not_touch_other_keys(factory).await,
    ));

    results
}

/// A value read back immediately after writing is byte-identical.
async fn set_then_get_is_identical<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let payload = sample_payload("a");
    s.set("livestockOwnerStep1", &payload)
        .await
        .map_err(|e| e.to_string())?;
    let read = s
        .get("livestockOwnerStep1")
        .await
        .map_err(|e| e.to_string())?;
    if read.as_deref() != Some(payload.as_str()) {
        return Err(format!("expected {:?}, got {:?}", payload, read));
    }
    Ok(())
}

async fn get_absent_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get("never-written").await.map_err(|e| e.to_string())? {
        None => Ok(()),
        Some(v) => Err(format!("expected None, got {:?}", v)),
    }
}

async fn unicode_and_whitespace_preserved<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let value = "  Ọlọ́run \"quoted\"\n\ttabbed  ";
    s.set("notes", value).await.map_err(|e| e.to_string())?;
    let read = s.get("notes").await.map_err(|e| e.to_string())?;
    if read.as_deref() != Some(value) {
        return Err(format!("expected {:?}, got {:?}", value, read));
    }
    Ok(())
}

/// A second write under the same key fully replaces the first.
async fn set_replaces_previous_value<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.set("livestockOwnerStep1", &sample_payload("first"))
        .await
        .map_err(|e| e.to_string())?;
    let second = sample_payload("second");
    s.set("livestockOwnerStep1", &second)
        .await
        .map_err(|e| e.to_string())?;
    let read = s
        .get("livestockOwnerStep1")
        .await
        .map_err(|e| e.to_string())?;
    if read.as_deref() != Some(second.as_str()) {
        return Err(format!("expected second payload, got {:?}", read));
    }
    Ok(())
}

async fn set_does_not_touch_other_keys<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.set("userToken", "tok").await.map_err(|e| e.to_string())?;
    s.set("livestockKeeperStep1", "x")
        .await
        .map_err(|e| e.to_string())?;
    s.set("livestockKeeperStep1", "y")
        .await
        .map_err(|e| e.to_string())?;
    let token = s.get("userToken").await.map_err(|e| e.to_string())?;
    if token.as_deref() != Some("tok") {
        return Err(format!("userToken changed to {:?}", token));
    }
    Ok(())
}
