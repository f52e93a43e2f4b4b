//! Merging staged step payloads into one submittable record.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::flow::{Endpoint, FlowDefinition};
use crate::value::{Fields, StepPayload};

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A locally captured image, referenced by URI. Bytes are read only when
/// the multipart body is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    /// Multipart field name the file is sent under.
    pub field: String,
    pub uri: String,
    pub mime_type: String,
    pub file_name: String,
    pub byte_size: Option<u64>,
}

impl MediaAttachment {
    /// An attachment with the default mime type and no file name yet; the
    /// flow's slot default is applied when the record is built.
    pub fn new(field: &str, uri: &str) -> Self {
        Self {
            field: field.to_string(),
            uri: uri.to_string(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            file_name: String::new(),
            byte_size: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    pub fn with_byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = Some(byte_size);
        self
    }

    /// Local filesystem path, with any `file://` scheme stripped.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix("file://").unwrap_or(&self.uri))
    }
}

/// A flow's merged input, shaped to the remote contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub endpoint: Endpoint,
    /// Remote field name → wire value.
    pub fields: BTreeMap<String, String>,
    pub attachments: Vec<MediaAttachment>,
    /// Staging keys whose payloads went into this record.
    pub consumed_keys: Vec<String>,
    required: Vec<String>,
    confirmation: Vec<(String, String)>,
}

impl MergedRecord {
    /// Required remote fields that are absent or empty, in declaration order.
    /// An attachment satisfies a requirement on its own field name.
    pub fn missing_required(&self) -> Vec<String> {
        self.required
            .iter()
            .filter(|f| {
                let has_value = self
                    .fields
                    .get(*f)
                    .map(|v| !v.trim().is_empty())
                    .unwrap_or(false);
                !has_value && !self.attachments.iter().any(|a| &a.field == *f)
            })
            .cloned()
            .collect()
    }

    pub fn is_multipart(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Identifiers the confirmation view receives as explicit parameters.
    pub fn confirmation_params(&self) -> BTreeMap<String, String> {
        self.confirmation
            .iter()
            .filter_map(|(field, param)| {
                self.fields
                    .get(field)
                    .map(|value| (param.clone(), value.clone()))
            })
            .collect()
    }

    /// The plain structured body used when nothing is attached.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Accumulates validated step payloads for one flow.
///
/// Later steps win when two steps carry the same local field name.
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    flow: &'a FlowDefinition,
    fields: Fields,
    consumed: Vec<String>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(flow: &'a FlowDefinition) -> Self {
        Self {
            flow,
            fields: Fields::new(),
            consumed: Vec::new(),
        }
    }

    /// Merge a staged payload read back from storage.
    pub fn add_step(&mut self, payload: StepPayload) -> &mut Self {
        self.fields.extend(payload.fields);
        self.consumed.push(payload.session_key);
        self
    }

    /// Merge the submit step's own input, which is never staged.
    pub fn add_fields(&mut self, fields: Fields) -> &mut Self {
        self.fields.extend(fields);
        self
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Apply the flow's mapping table and add derived fields.
    ///
    /// Attachments for fields the flow has no slot for are dropped.
    pub fn build(&self, profile: Option<&Value>, attachments: Vec<MediaAttachment>) -> MergedRecord {
        let mut fields = self.flow.mapping.apply(&self.fields);
        if let Some(name) = self.flow.captured_by.resolve(profile) {
            fields.insert("captured_by".to_string(), name);
        }

        let attachments = attachments
            .into_iter()
            .filter_map(|mut a| {
                let slot = self.flow.attachment_slot(&a.field)?;
                if a.file_name.is_empty() {
                    a.file_name = slot.default_name.clone();
                }
                Some(a)
            })
            .collect::<Vec<_>>();

        MergedRecord {
            endpoint: self.flow.endpoint.clone(),
            fields,
            attachments,
            consumed_keys: self.consumed.clone(),
            required: self.flow.required_remote.clone(),
            confirmation: self.flow.confirmation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;
    use serde_json::json;
    use time::macros::date;

    fn keeper_step1() -> StepPayload {
        let mut f = Fields::new();
        f.insert("surname".into(), "Okafor".into());
        f.insert("other_names".into(), "Chidi".into());
        f.insert("gender".into(), "MALE".into());
        f.insert("dateOfBirth".into(), date!(1985 - 03 - 09).into());
        f.insert("phone_number".into(), "08031234567".into());
        f.insert("email_address".into(), "chidi@farm.ng".into());
        f.insert("nin".into(), "12345678901".into());
        f.insert("state".into(), "25".into());
        f.insert("lga".into(), "1".into());
        f.insert("address".into(), "12 Market Rd".into());
        f.insert("livestock_keeper".into(), FieldValue::text("true"));
        StepPayload::new("livestockKeeperStep1", f)
    }

    fn keeper_step2() -> Fields {
        let mut f = Fields::new();
        f.insert("next_of_kin".into(), "Ada Okafor".into());
        f.insert("next_of_kin_number".into(), "08039876543".into());
        f.insert("id_doc_type".into(), "NIN slip".into());
        f.insert("prof_id_doc".into(), "A99".into());
        f.insert("farm_location".into(), "Ibadan".into());
        f
    }

    #[test]
    fn keeper_record_is_mapped_and_complete() {
        let flow = FlowDefinition::keeper();
        let mut b = RecordBuilder::new(&flow);
        b.add_step(keeper_step1()).add_fields(keeper_step2());
        let record = b.build(Some(&json!({"name": "Musa Bello"})), vec![]);

        assert_eq!(record.fields["date_of_birth"], "1985-03-09");
        assert_eq!(record.fields["email"], "chidi@farm.ng");
        assert_eq!(record.fields["is_livestock_keeper"], "1");
        assert_eq!(record.fields["marital_status"], "SINGLE");
        assert_eq!(record.fields["address2"], "");
        assert_eq!(record.fields["captured_by"], "Musa Bello");
        assert!(!record.fields.contains_key("email_address"));
        assert!(record.missing_required().is_empty());
        assert_eq!(record.consumed_keys, vec!["livestockKeeperStep1"]);
        assert!(!record.is_multipart());
    }

    #[test]
    fn missing_lga_is_reported() {
        let flow = FlowDefinition::keeper();
        let mut step1 = keeper_step1();
        step1.fields.remove("lga");
        let mut b = RecordBuilder::new(&flow);
        b.add_step(step1).add_fields(keeper_step2());
        assert_eq!(b.build(None, vec![]).missing_required(), vec!["lga"]);
    }

    #[test]
    fn attachments_get_slot_defaults_and_unknown_are_dropped() {
        let flow = FlowDefinition::keeper();
        let mut b = RecordBuilder::new(&flow);
        b.add_step(keeper_step1()).add_fields(keeper_step2());
        let record = b.build(
            None,
            vec![
                MediaAttachment::new("image", "file:///tmp/cap.jpg"),
                MediaAttachment::new("selfie", "/tmp/other.jpg"),
            ],
        );
        assert_eq!(record.attachments.len(), 1);
        assert_eq!(record.attachments[0].file_name, "profile.jpg");
        assert_eq!(record.attachments[0].mime_type, "image/jpeg");
        assert_eq!(record.attachments[0].path(), PathBuf::from("/tmp/cap.jpg"));
        assert!(record.is_multipart());
        assert_eq!(record.fields["captured_by"], "Unknown");
    }

    #[test]
    fn tag_confirmation_carries_tag_id() {
        let flow = FlowDefinition::tag();
        let mut scan = Fields::new();
        scan.insert("scanned_tag_id".into(), "NG-00042".into());
        let mut b = RecordBuilder::new(&flow);
        b.add_step(StepPayload::new("tagScan", scan));
        let record = b.build(None, vec![]);
        assert_eq!(record.confirmation_params()["tagId"], "NG-00042");
        assert!(record.missing_required().contains(&"weight".to_string()));
    }

    #[test]
    fn later_steps_override_earlier_values() {
        let flow = FlowDefinition::keeper();
        let mut b = RecordBuilder::new(&flow);
        b.add_step(keeper_step1());
        let mut redo = Fields::new();
        redo.insert("surname".into(), "Okeke".into());
        b.add_fields(redo);
        assert_eq!(b.build(None, vec![]).fields["surname"], "Okeke");
    }

    #[test]
    fn json_body_contains_only_strings() {
        let flow = FlowDefinition::location();
        let mut f = Fields::new();
        f.insert("owner_name".into(), "Bello".into());
        let mut b = RecordBuilder::new(&flow);
        b.add_fields(f);
        let body = b.build(None, vec![]).to_json();
        assert_eq!(body["owner_name"], "Bello");
        assert_eq!(body["captured_by"], "Unknown");
        assert!(body.get("lga").is_none());
    }
}
