//! Field values and persisted step payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// One step's input, keyed by local field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A single form field value.
///
/// Serialized with an explicit tag so that a text field that happens to look
/// like a date (or like `"true"`) reads back as the same variant it was
/// written as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Date(#[serde(with = "iso_date")] Date),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// True for an empty text value. Flags and dates are always present.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// The value as it is sent over the wire.
    ///
    /// Dates use `YYYY-MM-DD`; flags render as `true`/`false` here and are
    /// normalized to `1`/`0` by mapping tables that declare them as flags.
    pub fn to_wire(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Date(d) => iso_date::format(*d),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<Date> for FieldValue {
    fn from(d: Date) -> Self {
        FieldValue::Date(d)
    }
}

/// The validated output of one step, as written under its staging key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPayload {
    pub session_key: String,
    pub fields: Fields,
    /// RFC 3339 timestamp of when the payload was persisted. Debugging only.
    pub created_at: String,
}

impl StepPayload {
    /// Stamp a new payload with the current UTC time.
    pub fn new(session_key: impl Into<String>, fields: Fields) -> Self {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            session_key: session_key.into(),
            fields,
            created_at,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// `YYYY-MM-DD` serde support for [`Date`].
pub(crate) mod iso_date {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub(crate) fn format(date: Date) -> String {
        date.format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_default()
    }

    pub(crate) fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` string into a date field value.
pub fn parse_date(text: &str) -> Option<FieldValue> {
    iso_date::parse(text.trim()).ok().map(FieldValue::Date)
}
