//! Choose-from-list with an "Other" option that reveals a free-text field.

use crate::value::FieldValue;

/// Label of the option that switches the picker to free text.
pub const OTHER: &str = "Other";

/// Selection state of an "Other, please specify" picker.
///
/// `value` is what gets stored for the field. Choosing "Other" clears it
/// until non-blank free text is typed; the free text then becomes the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherPicker {
    value: String,
    free_text: String,
    other_visible: bool,
}

impl OtherPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick an option from the list.
    pub fn select(&mut self, option: &str) {
        self.other_visible = option.eq_ignore_ascii_case(OTHER);
        if self.other_visible {
            self.value.clear();
        } else {
            self.free_text.clear();
            self.value = option.to_string();
        }
    }

    /// Update the free-text field shown after choosing "Other".
    pub fn set_free_text(&mut self, text: &str) {
        self.free_text = text.to_string();
        if text.trim().is_empty() {
            self.value.clear();
        } else {
            self.value = text.to_string();
        }
    }

    /// The stored selection value (empty while "Other" has no text).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn is_other(&self) -> bool {
        self.other_visible
    }

    /// The value validation and staging see. Blank free text never counts.
    pub fn field_value(&self) -> FieldValue {
        FieldValue::text(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate_field, FieldSpec, REQUIRED};

    #[test]
    fn listed_option_is_the_value() {
        let mut p = OtherPicker::new();
        p.select("Kano");
        assert_eq!(p.value(), "Kano");
        assert!(!p.is_other());
    }

    #[test]
    fn other_clears_value_until_free_text() {
        let mut p = OtherPicker::new();
        p.select("Kano");
        p.select("Other");
        assert!(p.is_other());
        assert_eq!(p.value(), "");

        p.set_free_text("   ");
        assert_eq!(p.value(), "");

        p.set_free_text("Jos Plateau ranch");
        assert_eq!(p.value(), "Jos Plateau ranch");
        assert_eq!(p.field_value(), FieldValue::text("Jos Plateau ranch"));
    }

    #[test]
    fn lowercase_other_also_reveals_free_text() {
        let mut p = OtherPicker::new();
        p.select("other");
        assert!(p.is_other());
        assert_eq!(p.value(), "");
    }

    #[test]
    fn switching_back_to_listed_option_discards_free_text() {
        let mut p = OtherPicker::new();
        p.select("Other");
        p.set_free_text("Somewhere");
        p.select("Abuja");
        assert_eq!(p.value(), "Abuja");
        assert_eq!(p.free_text(), "");
        assert!(!p.is_other());
    }

    #[test]
    fn blank_free_text_fails_required() {
        let mut p = OtherPicker::new();
        p.select("Other");
        assert!(p.field_value().is_empty());

        p.set_free_text("   ");
        assert!(p.field_value().is_empty());
        let spec = FieldSpec::required("tagging_location");
        assert_eq!(validate_field(&spec, Some(&p.field_value())), REQUIRED);

        p.set_free_text("Kaduna ranch");
        assert_eq!(validate_field(&spec, Some(&p.field_value())), "");
    }
}
