//! Declarative local → remote field translation.
//!
//! Local step fields use the names the screens use (`email_address`,
//! `dateOfBirth`); the remote API uses its own (`email`, `date_of_birth`).
//! A [`MappingTable`] lists one [`FieldMapping`] per remote field.

use std::collections::BTreeMap;

use crate::value::{FieldValue, Fields};

/// How a local value is rendered for the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    AsIs,
    /// Boolean-ish value rendered as `"1"` / `"0"`.
    Flag01,
}

/// Normalize a boolean-ish value. Only `true`, `"true"`, and `"1"` are true.
pub fn normalize_flag(value: &FieldValue) -> bool {
    match value {
        FieldValue::Flag(b) => *b,
        FieldValue::Text(s) => s == "true" || s == "1",
        FieldValue::Date(_) => false,
    }
}

/// One remote field: where to read it from, how to render it, and what to
/// send when the local side has nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Local names to try, in order. The first non-empty one wins.
    pub local: Vec<String>,
    pub remote: String,
    pub transform: Transform,
    pub default: Option<String>,
}

impl FieldMapping {
    /// Same name on both sides.
    pub fn same(name: &str) -> Self {
        Self::rename(name, name)
    }

    pub fn rename(local: &str, remote: &str) -> Self {
        Self {
            local: vec![local.to_string()],
            remote: remote.to_string(),
            transform: Transform::AsIs,
            default: None,
        }
    }

    /// Fall back to another local name when the earlier ones are empty.
    pub fn or(mut self, local: &str) -> Self {
        self.local.push(local.to_string());
        self
    }

    pub fn flag(mut self) -> Self {
        self.transform = Transform::Flag01;
        self
    }

    pub fn default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    fn render(&self, value: &FieldValue) -> String {
        match self.transform {
            Transform::AsIs => value.to_wire(),
            Transform::Flag01 => if normalize_flag(value) { "1" } else { "0" }.to_string(),
        }
    }

    /// Resolve this mapping against merged local fields.
    ///
    /// `None` means the remote field is omitted.
    pub fn resolve(&self, fields: &Fields) -> Option<String> {
        self.local
            .iter()
            .filter_map(|name| fields.get(name))
            .find(|v| !v.is_empty())
            .map(|v| self.render(v))
            .or_else(|| self.default.clone())
    }
}

/// The full translation for one flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<FieldMapping>,
}

impl MappingTable {
    pub fn new(entries: Vec<FieldMapping>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FieldMapping] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate merged local fields into remote fields.
    pub fn apply(&self, fields: &Fields) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter_map(|m| m.resolve(fields).map(|v| (m.remote.clone(), v)))
            .collect()
    }
}
