//! Per-field validation rules and whole-step validation.
//!
//! A field is checked for presence first; only a present value is checked
//! against its rule. Optional fields that are empty are valid.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::{FieldValue, Fields};

pub const REQUIRED: &str = "This field is required";
pub const INVALID_PHONE: &str = "Please enter a valid 11-digit phone number";
pub const INVALID_NIN: &str = "Please enter a valid 11-digit NIN";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_DOCUMENT: &str = "Please enter a valid document number";

static ELEVEN_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{11}$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// The rule applied to a present field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Any non-empty value.
    Any,
    /// Exactly 11 ASCII digits.
    Phone,
    /// National identification number: exactly 11 ASCII digits.
    NationalId,
    /// `local@domain.tld`, checked on the trimmed, lower-cased value.
    Email,
    /// Free-text document number; must contain something other than whitespace.
    Document,
}

/// Declaration of one input field of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            rule: FieldRule::Any,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            rule: FieldRule::Any,
        }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }
}

/// Validate one field. Returns the error text, or an empty string when valid.
pub fn validate_field(spec: &FieldSpec, value: Option<&FieldValue>) -> String {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ if spec.required => return REQUIRED.to_string(),
        _ => return String::new(),
    };

    // Rules only constrain text; flags and dates are well-formed by construction.
    let Some(text) = value.as_text() else {
        return String::new();
    };

    let ok = match spec.rule {
        FieldRule::Any => true,
        FieldRule::Phone | FieldRule::NationalId => ELEVEN_DIGITS.is_match(text),
        FieldRule::Email => EMAIL.is_match(&text.trim().to_lowercase()),
        FieldRule::Document => !text.trim().is_empty(),
    };
    if ok {
        return String::new();
    }
    match spec.rule {
        FieldRule::Any => String::new(),
        FieldRule::Phone => INVALID_PHONE.to_string(),
        FieldRule::NationalId => INVALID_NIN.to_string(),
        FieldRule::Email => INVALID_EMAIL.to_string(),
        FieldRule::Document => INVALID_DOCUMENT.to_string(),
    }
}

/// Field name → error text. An empty string means the field is valid.
///
/// Rebuilt from scratch whenever a step is resumed; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    errors: BTreeMap<String, String>,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validate a single field (on change) and record the outcome.
    pub fn check(&mut self, spec: &FieldSpec, value: Option<&FieldValue>) -> bool {
        let error = validate_field(spec, value);
        let ok = error.is_empty();
        self.errors.insert(spec.name.clone(), error);
        ok
    }

    /// The recorded error for `name`, or `""` if valid or never checked.
    pub fn error(&self, name: &str) -> &str {
        self.errors.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_valid(&self) -> bool {
        self.errors.values().all(String::is_empty)
    }

    /// Fields that currently carry an error.
    pub fn failing(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .filter(|(_, e)| !e.is_empty())
            .map(|(n, e)| (n.as_str(), e.as_str()))
    }
}

/// A step that failed validation. Carries the first failing field (in
/// declaration order) and the full state for per-field display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct StepRejected {
    pub field: String,
    pub message: String,
    pub state: ValidationState,
}

/// Validate every field of a step.
///
/// All fields are checked so the returned state is complete, but the error
/// surfaced is the first failure in `specs` order.
pub fn validate_step(specs: &[FieldSpec], fields: &Fields) -> Result<ValidationState, StepRejected> {
    let mut state = ValidationState::new();
    let mut first: Option<(String, String)> = None;

    for spec in specs {
        if !state.check(spec, fields.get(&spec.name)) && first.is_none() {
            first = Some((spec.name.clone(), state.error(&spec.name).to_string()));
        }
    }

    match first {
        None => Ok(state),
        Some((field, message)) => Err(StepRejected {
            field,
            message,
            state,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    #[test]
    fn required_checked_before_rule() {
        let spec = FieldSpec::required("phone_number").rule(FieldRule::Phone);
        assert_eq!(validate_field(&spec, None), REQUIRED);
        assert_eq!(validate_field(&spec, Some(&text(""))), REQUIRED);
    }

    #[test]
    fn phone_and_nin_accept_exactly_eleven_digits() {
        for rule in [FieldRule::Phone, FieldRule::NationalId] {
            let spec = FieldSpec::required("n").rule(rule);
            assert_eq!(validate_field(&spec, Some(&text("08012345678"))), "");
            for bad in ["0801234567", "080123456789", "0801234567a", "+2348012345", " 08012345678", "٠٨٠١٢٣٤٥٦٧٨"] {
                assert_ne!(validate_field(&spec, Some(&text(bad))), "", "{bad} accepted");
            }
        }
    }

    #[test]
    fn rule_specific_messages() {
        let phone = FieldSpec::required("p").rule(FieldRule::Phone);
        let nin = FieldSpec::required("n").rule(FieldRule::NationalId);
        assert_eq!(validate_field(&phone, Some(&text("1"))), INVALID_PHONE);
        assert_eq!(validate_field(&nin, Some(&text("1"))), INVALID_NIN);
    }

    #[test]
    fn email_shape() {
        let spec = FieldSpec::required("email_address").rule(FieldRule::Email);
        assert_eq!(validate_field(&spec, Some(&text("ade@farm.ng"))), "");
        assert_eq!(validate_field(&spec, Some(&text("  Ade@Farm.NG "))), "");
        for bad in ["ade", "ade@farm", "a de@farm.ng", "@farm.ng", "ade@.ng"] {
            assert_eq!(validate_field(&spec, Some(&text(bad))), INVALID_EMAIL, "{bad}");
        }
    }

    #[test]
    fn document_must_not_be_blank() {
        let spec = FieldSpec::required("prof_id_doc").rule(FieldRule::Document);
        assert_eq!(validate_field(&spec, Some(&text("   "))), INVALID_DOCUMENT);
        assert_eq!(validate_field(&spec, Some(&text("A1234"))), "");
    }

    #[test]
    fn optional_empty_is_valid_but_present_value_is_checked() {
        let spec = FieldSpec::optional("email").rule(FieldRule::Email);
        assert_eq!(validate_field(&spec, None), "");
        assert_eq!(validate_field(&spec, Some(&text(""))), "");
        assert_eq!(validate_field(&spec, Some(&text("nope"))), INVALID_EMAIL);
    }

    #[test]
    fn validate_step_surfaces_first_failure_in_declaration_order() {
        let specs = vec![
            FieldSpec::required("surname"),
            FieldSpec::required("nin").rule(FieldRule::NationalId),
            FieldSpec::required("lga"),
        ];
        let mut fields = Fields::new();
        fields.insert("surname".into(), text("Bello"));
        fields.insert("nin".into(), text("123"));

        let rejected = validate_step(&specs, &fields).unwrap_err();
        assert_eq!(rejected.field, "nin");
        assert_eq!(rejected.message, INVALID_NIN);
        assert_eq!(rejected.state.error("lga"), REQUIRED);
        assert_eq!(rejected.state.failing().count(), 2);
    }

    #[test]
    fn validate_step_ok_when_all_pass() {
        let specs = vec![FieldSpec::required("a"), FieldSpec::optional("b")];
        let mut fields = Fields::new();
        fields.insert("a".into(), text("x"));
        let state = validate_step(&specs, &fields).unwrap();
        assert!(state.is_valid());
    }

    #[test]
    fn state_check_clears_error_once_fixed() {
        let spec = FieldSpec::required("next_of_kin_number").rule(FieldRule::Phone);
        let mut state = ValidationState::new();
        assert!(!state.check(&spec, Some(&text("0803"))));
        assert_eq!(state.error("next_of_kin_number"), INVALID_PHONE);
        assert!(state.check(&spec, Some(&text("08031234567"))));
        assert_eq!(state.error("next_of_kin_number"), "");
        assert!(state.is_valid());
    }
}
