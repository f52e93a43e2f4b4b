/// All errors that can be returned by a KeyValueStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("storage io error at {path}: {message}")]
    Io { path: String, message: String },

    /// The persisted store exists but is not a JSON object of string values.
    #[error("storage file {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },

    /// A backend-specific storage error.
    #[error("storage backend error: {0}")]
    Backend(String),
}
