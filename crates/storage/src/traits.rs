use async_trait::async_trait;

use crate::error::StorageError;

/// The local key-value store used as form-staging scratch space.
///
/// A `KeyValueStore` maps string keys to string values. It has no
/// transactions and no expiry: a value stays until it is overwritten or
/// removed. Callers serialize structured values (step payloads, cached
/// profiles) to JSON before storing them.
///
/// ## Write semantics
///
/// `set` fully replaces any previous value for the key. `remove` and
/// `multi_remove` are idempotent: removing an absent key is not an error.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a store can be shared
/// between a session and the fan-out tasks it spawns.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Absent keys are ignored.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key in `keys`. Keys not listed are left untouched.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// List all keys currently stored, in ascending order.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}
