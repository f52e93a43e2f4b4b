//! Staged multi-step form sessions over a key-value store and the remote API.
//!
//! - [`session`] — [`FormSession`]: staging, resumption, submission
//! - [`auth`] — login, logout, expired-session teardown
//! - [`staging`] — step payload persistence and listing
//! - [`dashboard`] — dashboard summary with cached fallback
//! - [`reports`] — record listings
//! - [`regions`] — state → LGA reference data

pub mod auth;
pub mod dashboard;
mod error;
pub mod regions;
pub mod reports;
pub mod session;
pub mod staging;

pub use dashboard::load_dashboard;
pub use error::{FlowError, Route};
pub use regions::load_regions;
pub use reports::load_report;
pub use session::{CancelToken, Confirmation, FormSession, SubmitOutcome};
pub use staging::{staged_entries, StagedEntry};
