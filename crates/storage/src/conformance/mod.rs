//! Conformance test suite for `KeyValueStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `KeyValueStore` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Round-trip**: a value read back is byte-identical to the value written
//! - **Overwrite**: `set` replaces the previous value wholesale
//! - **Removal**: `remove`/`multi_remove` delete exactly the named keys
//! - **Listing**: `keys` reports every stored key in ascending order
//!
//! # Usage
//!
//! Backend tests call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty store for each test:
//!
//! ```ignore
//! use ranch_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| async { open_test_store().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod listing;
mod removal;
mod roundtrip;

use std::fmt;
use std::future::Future;

use crate::KeyValueStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "roundtrip", "removal").
    pub category: String,
    /// Test name (e.g. "set_then_get_is_identical").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: KeyValueStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(roundtrip::run_roundtrip_tests(&factory).await);
    results.extend(removal::run_removal_tests(&factory).await);
    results.extend(listing::run_listing_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

/// A staged step payload as the session layer writes it.
fn sample_payload(marker: &str) -> String {
    format!(
        r#"{{"session_key":"livestockOwnerStep1","fields":{{"surname":"Ade {marker}","nin":"12345678901"}},"created_at":"2025-01-01T00:00:00Z"}}"#
    )
}
