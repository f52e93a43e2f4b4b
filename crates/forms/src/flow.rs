//! Flow definitions.
//!
//! A flow is an ordered list of steps ending in a remote submission. Every
//! step but the last is staged under its session key; the last step's input
//! goes straight into the merged record. The four registration flows are
//! built in; other flows can be assembled with [`FlowDefinition::builder`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::mapping::{FieldMapping, MappingTable};
use crate::validate::{FieldRule, FieldSpec};

/// The remote create operation a flow submits to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AddKeeper,
    AddOwner,
    AddLocation,
    TagLivestock,
    /// An arbitrary path relative to the API base URL.
    Custom(String),
}

impl Endpoint {
    /// Key used to override the path in configuration.
    pub fn config_key(&self) -> &str {
        match self {
            Endpoint::AddKeeper => "add_keeper",
            Endpoint::AddOwner => "add_owner",
            Endpoint::AddLocation => "add_location",
            Endpoint::TagLivestock => "tag_livestock",
            Endpoint::Custom(path) => path,
        }
    }

    pub fn default_path(&self) -> &str {
        match self {
            Endpoint::AddKeeper => "/api/enumerator/add_livestock_keeper",
            Endpoint::AddOwner => "/api/enumerator/add_livestock_owner",
            Endpoint::AddLocation => "/api/enumerator/add_registration_location",
            Endpoint::TagLivestock => "/api/enumerator/tag_livestock",
            Endpoint::Custom(path) => path,
        }
    }
}

/// How the submitting user's name is derived from the cached profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedBy {
    None,
    /// First non-empty string among `keys` in the profile, else `fallback`.
    Profile { keys: Vec<String>, fallback: String },
}

impl CapturedBy {
    pub fn profile(keys: &[&str], fallback: &str) -> Self {
        CapturedBy::Profile {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            fallback: fallback.to_string(),
        }
    }

    pub fn resolve(&self, profile: Option<&Value>) -> Option<String> {
        let CapturedBy::Profile { keys, fallback } = self else {
            return None;
        };
        let found = profile.and_then(|p| {
            keys.iter()
                .filter_map(|k| p.get(k).and_then(Value::as_str))
                .find(|v| !v.trim().is_empty())
                .map(str::to_string)
        });
        Some(found.unwrap_or_else(|| fallback.clone()))
    }
}

/// A multipart file field the submit step may attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSlot {
    pub field: String,
    pub default_name: String,
}

impl AttachmentSlot {
    pub fn new(field: &str, default_name: &str) -> Self {
        Self {
            field: field.to_string(),
            default_name: default_name.to_string(),
        }
    }
}

/// One screen's worth of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub session_key: String,
    pub fields: Vec<FieldSpec>,
}

impl StepDefinition {
    pub fn new(session_key: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            session_key: session_key.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowDefinitionError {
    #[error("flow id must not be empty")]
    EmptyId,
    #[error("flow '{0}' has no steps")]
    NoSteps(String),
    #[error("flow '{flow}' declares step key '{key}' more than once")]
    DuplicateStep { flow: String, key: String },
    #[error("flow '{flow}' requires remote field '{field}' but nothing produces it")]
    UnmappedRequired { flow: String, field: String },
}

/// Everything needed to stage, merge, and submit one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDefinition {
    pub id: String,
    pub endpoint: Endpoint,
    pub steps: Vec<StepDefinition>,
    pub mapping: MappingTable,
    /// Remote field names that must be present and non-empty before sending.
    pub required_remote: Vec<String>,
    pub captured_by: CapturedBy,
    pub attachments: Vec<AttachmentSlot>,
    /// `(remote field, confirmation parameter)` pairs handed to the
    /// confirmation view on success.
    pub confirmation: Vec<(String, String)>,
}

impl FlowDefinition {
    pub fn builder(id: &str, endpoint: Endpoint) -> FlowBuilder {
        FlowBuilder {
            flow: FlowDefinition {
                id: id.to_string(),
                endpoint,
                steps: Vec::new(),
                mapping: MappingTable::default(),
                required_remote: Vec::new(),
                captured_by: CapturedBy::None,
                attachments: Vec::new(),
                confirmation: Vec::new(),
            },
            mappings: Vec::new(),
        }
    }

    /// Steps whose payloads are staged between screens.
    pub fn staged_steps(&self) -> &[StepDefinition] {
        match self.steps.split_last() {
            Some((_, staged)) => staged,
            None => &[],
        }
    }

    /// The step whose "next" submits the flow.
    pub fn submit_step(&self) -> Option<&StepDefinition> {
        self.steps.last()
    }

    pub fn staged_keys(&self) -> Vec<&str> {
        self.staged_steps()
            .iter()
            .map(|s| s.session_key.as_str())
            .collect()
    }

    /// Position and definition of the step with `key`.
    pub fn step(&self, key: &str) -> Option<(usize, &StepDefinition)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.session_key == key)
    }

    pub fn is_submit_step(&self, key: &str) -> bool {
        self.submit_step().map(|s| s.session_key == key).unwrap_or(false)
    }

    pub fn attachment_slot(&self, field: &str) -> Option<&AttachmentSlot> {
        self.attachments.iter().find(|a| a.field == field)
    }

    pub fn keeper() -> Self {
        builtin(
            FlowDefinition::builder("keeper", Endpoint::AddKeeper)
                .step(
                    "livestockKeeperStep1",
                    vec![
                        FieldSpec::required("surname"),
                        FieldSpec::required("other_names"),
                        FieldSpec::required("gender"),
                        FieldSpec::required("dateOfBirth"),
                        FieldSpec::required("phone_number").rule(FieldRule::Phone),
                        FieldSpec::required("email_address").rule(FieldRule::Email),
                        FieldSpec::required("nin").rule(FieldRule::NationalId),
                        FieldSpec::required("state"),
                        FieldSpec::required("lga"),
                        FieldSpec::required("address"),
                        FieldSpec::optional("address2"),
                        FieldSpec::optional("marital_status"),
                        FieldSpec::optional("livestock_keeper"),
                    ],
                )
                .step("livestockKeeperStep2", registration_step2())
                .map(FieldMapping::same("surname"))
                .map(FieldMapping::same("other_names"))
                .map(FieldMapping::same("gender"))
                .map(FieldMapping::rename("dateOfBirth", "date_of_birth").or("dob"))
                .map(FieldMapping::same("phone_number"))
                .map(FieldMapping::rename("email_address", "email"))
                .map(FieldMapping::same("nin"))
                .map(FieldMapping::same("state"))
                .map(FieldMapping::same("lga"))
                .map(FieldMapping::same("address"))
                .map(FieldMapping::same("address2").default(""))
                .map(FieldMapping::same("marital_status").default("SINGLE"))
                .map(
                    FieldMapping::rename("livestock_keeper", "is_livestock_keeper")
                        .flag()
                        .default("1"),
                )
                .maps(registration_step2_mappings())
                .require(&[
                    "surname",
                    "other_names",
                    "gender",
                    "date_of_birth",
                    "phone_number",
                    "email",
                    "nin",
                    "state",
                    "lga",
                    "address",
                    "next_of_kin",
                    "next_of_kin_number",
                    "id_doc_type",
                    "prof_id_doc",
                    "farm_location",
                    "marital_status",
                ])
                .captured_by(CapturedBy::profile(&["name"], "Unknown"))
                .attachment(AttachmentSlot::new("image", "profile.jpg")),
        )
    }

    pub fn owner() -> Self {
        builtin(
            FlowDefinition::builder("owner", Endpoint::AddOwner)
                .step(
                    "livestockOwnerStep1",
                    vec![
                        FieldSpec::required("surname"),
                        FieldSpec::required("other_names"),
                        FieldSpec::required("gender"),
                        FieldSpec::required("dob"),
                        FieldSpec::required("phone_number").rule(FieldRule::Phone),
                        FieldSpec::required("email_address").rule(FieldRule::Email),
                        FieldSpec::required("nin").rule(FieldRule::NationalId),
                        FieldSpec::required("state"),
                        FieldSpec::required("lga"),
                        FieldSpec::required("address1"),
                        FieldSpec::optional("address2"),
                        FieldSpec::required("ownership_type"),
                        FieldSpec::optional("livestock_keeper"),
                    ],
                )
                .step("livestockOwnerStep2", registration_step2())
                .map(FieldMapping::same("surname"))
                .map(FieldMapping::same("other_names"))
                .map(FieldMapping::same("gender"))
                .map(FieldMapping::rename("dob", "date_of_birth").or("dateOfBirth"))
                .map(FieldMapping::same("phone_number"))
                .map(FieldMapping::rename("email_address", "email"))
                .map(FieldMapping::same("nin"))
                .map(FieldMapping::same("state"))
                .map(FieldMapping::same("lga"))
                .map(FieldMapping::rename("address1", "address").or("address"))
                .map(FieldMapping::same("address2").default(""))
                .map(FieldMapping::same("ownership_type"))
                .map(FieldMapping::same("group_name").default(""))
                .map(FieldMapping::same("livestock_keeper").flag().default("0"))
                .maps(registration_step2_mappings())
                .require(&[
                    "surname",
                    "other_names",
                    "gender",
                    "date_of_birth",
                    "phone_number",
                    "email",
                    "nin",
                    "state",
                    "lga",
                    "address",
                    "ownership_type",
                    "next_of_kin",
                    "next_of_kin_number",
                    "id_doc_type",
                    "prof_id_doc",
                    "farm_location",
                ])
                .captured_by(CapturedBy::profile(&["username", "email"], "enumerator"))
                .attachment(AttachmentSlot::new("image", "profile.jpg")),
        )
    }

    /// Single-step flow; submitted as JSON.
    pub fn location() -> Self {
        let fields = [
            "owner_name",
            "location_name",
            "location_address",
            "location_type",
            "state",
            "lga",
        ];
        let mut specs: Vec<FieldSpec> = fields.iter().map(|f| FieldSpec::required(*f)).collect();
        specs.push(FieldSpec::optional("cac_certificate").rule(FieldRule::Document));
        specs.push(FieldSpec::optional("additional_notes"));
        specs.push(FieldSpec::optional("gps_coordinates"));

        let mut builder = FlowDefinition::builder("location", Endpoint::AddLocation)
            .step("addLocation", specs)
            .require(&fields)
            .captured_by(CapturedBy::profile(&["name"], "Unknown"));
        for name in fields
            .iter()
            .chain(["cac_certificate", "additional_notes", "gps_coordinates"].iter())
        {
            builder = builder.map(FieldMapping::same(name));
        }
        builtin(builder)
    }

    pub fn tag() -> Self {
        let details = [
            "passport_id",
            "livestock_keeper",
            "livestock_owner",
            "livestock_type",
            "livestock_breed",
            "gender",
            "health_status",
            "date_of_birth",
            "birth_period",
        ];
        let mut builder = FlowDefinition::builder("tag", Endpoint::TagLivestock)
            .step("tagScan", vec![FieldSpec::required("scanned_tag_id")])
            .step(
                "tagLivestockData",
                details.iter().map(|f| FieldSpec::required(*f)).collect(),
            )
            .step(
                "tagVerification",
                vec![
                    FieldSpec::required("tagging_location"),
                    FieldSpec::required("weight"),
                    FieldSpec::optional("description"),
                    FieldSpec::optional("production_type"),
                    FieldSpec::optional("comments_other_location"),
                ],
            )
            .map(FieldMapping::rename("scanned_tag_id", "tag_id"));
        for name in details {
            builder = builder.map(FieldMapping::same(name));
        }
        builtin(
            builder
                .map(FieldMapping::same("tagging_location"))
                .map(FieldMapping::same("weight"))
                .map(FieldMapping::same("description"))
                .map(FieldMapping::same("production_type"))
                .map(FieldMapping::rename("comments_other_location", "comments"))
                .require(&["tag_id"])
                .require(&details)
                .require(&["tagging_location", "weight"])
                .captured_by(CapturedBy::profile(&["name"], "Unknown"))
                .attachment(AttachmentSlot::new("verification_photo", "verification.jpg"))
                .attachment(AttachmentSlot::new("muzzle_photo", "muzzle.jpg"))
                .confirm("tag_id", "tagId"),
        )
    }
}

/// Finish a builder without consistency checks. Built-in flows are checked
/// in the tests below.
fn builtin(builder: FlowBuilder) -> FlowDefinition {
    let mut flow = builder.flow;
    flow.mapping = MappingTable::new(builder.mappings);
    flow
}

/// Second step shared by the keeper and owner flows.
fn registration_step2() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("next_of_kin"),
        FieldSpec::required("next_of_kin_number").rule(FieldRule::Phone),
        FieldSpec::required("id_doc_type"),
        FieldSpec::required("prof_id_doc").rule(FieldRule::Document),
        FieldSpec::required("farm_location"),
    ]
}

fn registration_step2_mappings() -> Vec<FieldMapping> {
    ["next_of_kin", "next_of_kin_number", "id_doc_type", "prof_id_doc", "farm_location"]
        .iter()
        .map(|f| FieldMapping::same(f))
        .collect()
}

/// Incremental construction of a [`FlowDefinition`].
#[derive(Debug, Clone)]
pub struct FlowBuilder {
    flow: FlowDefinition,
    mappings: Vec<FieldMapping>,
}

impl FlowBuilder {
    pub fn step(mut self, session_key: &str, fields: Vec<FieldSpec>) -> Self {
        self.flow.steps.push(StepDefinition::new(session_key, fields));
        self
    }

    pub fn map(mut self, mapping: FieldMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn maps(mut self, mappings: impl IntoIterator<Item = FieldMapping>) -> Self {
        self.mappings.extend(mappings);
        self
    }

    pub fn require(mut self, fields: &[&str]) -> Self {
        self.flow
            .required_remote
            .extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn captured_by(mut self, captured_by: CapturedBy) -> Self {
        self.flow.captured_by = captured_by;
        self
    }

    pub fn attachment(mut self, slot: AttachmentSlot) -> Self {
        self.flow.attachments.push(slot);
        self
    }

    pub fn confirm(mut self, remote_field: &str, param: &str) -> Self {
        self.flow
            .confirmation
            .push((remote_field.to_string(), param.to_string()));
        self
    }

    /// Check the definition for internal consistency and finish it.
    pub fn build(self) -> Result<FlowDefinition, FlowDefinitionError> {
        let id = self.flow.id.clone();
        if id.trim().is_empty() {
            return Err(FlowDefinitionError::EmptyId);
        }
        if self.flow.steps.is_empty() {
            return Err(FlowDefinitionError::NoSteps(id));
        }
        let mut seen = BTreeSet::new();
        for step in &self.flow.steps {
            if !seen.insert(step.session_key.as_str()) {
                return Err(FlowDefinitionError::DuplicateStep {
                    flow: id,
                    key: step.session_key.clone(),
                });
            }
        }
        let produced: BTreeSet<&str> = self
            .mappings
            .iter()
            .map(|m| m.remote.as_str())
            .chain(self.flow.attachments.iter().map(|a| a.field.as_str()))
            .chain(
                matches!(self.flow.captured_by, CapturedBy::Profile { .. }).then_some("captured_by"),
            )
            .collect();
        if let Some(field) = self
            .flow
            .required_remote
            .iter()
            .find(|f| !produced.contains(f.as_str()))
        {
            return Err(FlowDefinitionError::UnmappedRequired {
                flow: id,
                field: field.clone(),
            });
        }
        Ok(builtin(self))
    }
}

/// The built-in flows, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Keeper,
    Owner,
    Location,
    Tag,
}

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [FlowKind::Keeper, FlowKind::Owner, FlowKind::Location, FlowKind::Tag];

    pub fn definition(self) -> FlowDefinition {
        match self {
            FlowKind::Keeper => FlowDefinition::keeper(),
            FlowKind::Owner => FlowDefinition::owner(),
            FlowKind::Location => FlowDefinition::location(),
            FlowKind::Tag => FlowDefinition::tag(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Keeper => "keeper",
            FlowKind::Owner => "owner",
            FlowKind::Location => "location",
            FlowKind::Tag => "tag",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keeper" => Ok(FlowKind::Keeper),
            "owner" => Ok(FlowKind::Owner),
            "location" => Ok(FlowKind::Location),
            "tag" => Ok(FlowKind::Tag),
            other => Err(format!(
                "unknown flow '{other}' (expected keeper, owner, location, or tag)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rebuild(flow: &FlowDefinition) -> Result<FlowDefinition, FlowDefinitionError> {
        let mut builder = FlowDefinition::builder(&flow.id, flow.endpoint.clone())
            .maps(flow.mapping.entries().to_vec())
            .captured_by(flow.captured_by.clone());
        for step in &flow.steps {
            builder = builder.step(&step.session_key, step.fields.clone());
        }
        let required: Vec<&str> = flow.required_remote.iter().map(String::as_str).collect();
        builder = builder.require(&required);
        for slot in &flow.attachments {
            builder = builder.attachment(slot.clone());
        }
        builder.build()
    }

    #[test]
    fn builtin_flows_are_consistent() {
        for kind in FlowKind::ALL {
            let flow = kind.definition();
            let rebuilt = rebuild(&flow).unwrap_or_else(|e| panic!("{kind}: {e}"));
            assert_eq!(rebuilt.required_remote, flow.required_remote);
        }
    }

    #[test]
    fn staged_keys_exclude_submit_step() {
        assert_eq!(FlowDefinition::keeper().staged_keys(), vec!["livestockKeeperStep1"]);
        assert_eq!(FlowDefinition::tag().staged_keys(), vec!["tagScan", "tagLivestockData"]);
        assert!(FlowDefinition::location().staged_keys().is_empty());
    }

    #[test]
    fn flows_do_not_share_staging_keys() {
        let mut all = BTreeSet::new();
        for kind in FlowKind::ALL {
            for step in kind.definition().steps {
                assert!(all.insert(step.session_key.clone()), "{}", step.session_key);
            }
        }
    }

    #[test]
    fn builder_rejects_bad_definitions() {
        assert_eq!(
            FlowDefinition::builder(" ", Endpoint::AddOwner).build(),
            Err(FlowDefinitionError::EmptyId)
        );
        assert_eq!(
            FlowDefinition::builder("x", Endpoint::AddOwner).build(),
            Err(FlowDefinitionError::NoSteps("x".into()))
        );
        let dup = FlowDefinition::builder("x", Endpoint::AddOwner)
            .step("a", vec![])
            .step("a", vec![])
            .build();
        assert!(matches!(dup, Err(FlowDefinitionError::DuplicateStep { .. })));

        let unmapped = FlowDefinition::builder("x", Endpoint::Custom("/api/x".into()))
            .step("a", vec![FieldSpec::required("name")])
            .require(&["name"])
            .build();
        assert!(matches!(unmapped, Err(FlowDefinitionError::UnmappedRequired { .. })));
    }

    #[test]
    fn custom_flow_builds() {
        let flow = FlowDefinition::builder("farm_visit", Endpoint::Custom("/api/visits".into()))
            .step("visitStep1", vec![FieldSpec::required("farm")])
            .step("visitStep2", vec![FieldSpec::required("notes")])
            .map(FieldMapping::same("farm"))
            .map(FieldMapping::same("notes"))
            .require(&["farm", "notes"])
            .build()
            .unwrap();
        assert_eq!(flow.staged_keys(), vec!["visitStep1"]);
        assert!(flow.is_submit_step("visitStep2"));
        assert_eq!(flow.endpoint.default_path(), "/api/visits");
    }

    #[test]
    fn captured_by_fallback_chain() {
        let owner = FlowDefinition::owner().captured_by;
        assert_eq!(
            owner.resolve(Some(&json!({"username": "", "email": "e@x.ng"}))).as_deref(),
            Some("e@x.ng")
        );
        assert_eq!(owner.resolve(None).as_deref(), Some("enumerator"));

        let keeper = FlowDefinition::keeper().captured_by;
        assert_eq!(keeper.resolve(Some(&json!({"name": "Musa"}))).as_deref(), Some("Musa"));
        assert_eq!(keeper.resolve(Some(&json!({}))).as_deref(), Some("Unknown"));
        assert_eq!(CapturedBy::None.resolve(Some(&json!({"name": "x"}))), None);
    }

    #[test]
    fn flow_kind_parses_case_insensitively() {
        assert_eq!("Owner".parse::<FlowKind>(), Ok(FlowKind::Owner));
        assert!("cattle".parse::<FlowKind>().is_err());
    }
}
