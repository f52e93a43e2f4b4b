//! Form model for staged livestock-registration flows.
//!
//! Everything in this crate is pure: no I/O, no clocks except where a
//! timestamp is stamped onto a new [`StepPayload`]. The session crate wires
//! these pieces to a key-value store and an HTTP transport.
//!
//! - [`value`] — field values and persisted step payloads
//! - [`validate`] — per-field rules and whole-step validation
//! - [`picker`] — the "Other, please specify" selection pattern
//! - [`catalog`] — state → LGA reference data and the dependent selector
//! - [`mapping`] — declarative local → remote field translation
//! - [`flow`] — flow definitions (keeper, owner, location, tag, custom)
//! - [`record`] — merging staged steps into a submittable record
//! - [`message`] — user-facing failure text
//! - [`normalize`] — list-response shape normalization
//! - [`report`] — dashboard period counts

pub mod catalog;
pub mod flow;
pub mod mapping;
pub mod message;
pub mod normalize;
pub mod picker;
pub mod record;
pub mod report;
pub mod validate;
pub mod value;

pub use catalog::{CascadeSelect, CascadeStatus, CatalogError, Choice, RegionCatalog};
pub use flow::{
    AttachmentSlot, CapturedBy, Endpoint, FlowDefinition, FlowDefinitionError, FlowKind,
    StepDefinition,
};
pub use mapping::{normalize_flag, FieldMapping, MappingTable, Transform};
pub use picker::OtherPicker;
pub use record::{MediaAttachment, MergedRecord, RecordBuilder};
pub use report::{DashboardSummary, PeriodCounts};
pub use validate::{validate_field, validate_step, FieldRule, FieldSpec, StepRejected, ValidationState};
pub use value::{parse_date, FieldValue, Fields, StepPayload};
