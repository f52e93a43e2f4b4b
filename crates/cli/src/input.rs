//! Turning `NAME=VALUE` command-line arguments into step fields and uploads.

use std::collections::BTreeMap;
use std::path::Path;

use clap::Args;
use ranch_forms::{normalize_flag, parse_date, FieldValue, Fields, MediaAttachment, OtherPicker};
use ranch_session::FlowError;

/// Field values for one step.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FieldArgs {
    /// Text field; `NAME=Other` switches the field to free text
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Date field
    #[arg(long = "date", value_name = "NAME=YYYY-MM-DD")]
    pub dates: Vec<String>,

    /// Yes/no field
    #[arg(long = "flag", value_name = "NAME=true|false")]
    pub flags: Vec<String>,

    /// Free text for a field whose option is "Other"
    #[arg(long = "other", value_name = "NAME=TEXT")]
    pub other: Vec<String>,
}

fn split_pair(arg: &str) -> Result<(String, String), FlowError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(FlowError::Input(format!("expected NAME=VALUE, got '{}'", arg))),
    }
}

impl FieldArgs {
    pub fn to_fields(&self) -> Result<Fields, FlowError> {
        let mut fields = Fields::new();

        let mut other_text = BTreeMap::new();
        for arg in &self.other {
            let (name, text) = split_pair(arg)?;
            other_text.insert(name, text);
        }

        for arg in &self.fields {
            let (name, value) = split_pair(arg)?;
            let mut picker = OtherPicker::new();
            picker.select(&value);
            if picker.is_other() {
                picker.set_free_text(other_text.get(&name).map(String::as_str).unwrap_or(""));
                fields.insert(name, picker.field_value());
            } else {
                fields.insert(name, FieldValue::text(value));
            }
        }
        // `--other` alone implies the "Other" option.
        for (name, text) in other_text {
            if !fields.contains_key(&name) {
                let mut picker = OtherPicker::new();
                picker.select(ranch_forms::picker::OTHER);
                picker.set_free_text(&text);
                fields.insert(name, picker.field_value());
            }
        }

        for arg in &self.dates {
            let (name, value) = split_pair(arg)?;
            let date = parse_date(&value).ok_or_else(|| {
                FlowError::Input(format!("invalid date for {}: expected YYYY-MM-DD", name))
            })?;
            fields.insert(name, date);
        }

        for arg in &self.flags {
            let (name, value) = split_pair(arg)?;
            let on = normalize_flag(&FieldValue::text(value.trim().to_ascii_lowercase()));
            fields.insert(name, FieldValue::Flag(on));
        }

        Ok(fields)
    }
}

/// Parse `FIELD=PATH` upload arguments.
pub(crate) fn attachments(args: &[String]) -> Result<Vec<MediaAttachment>, FlowError> {
    args.iter()
        .map(|arg| {
            let (field, path) = split_pair(arg)?;
            let file = Path::new(&path);
            let mut attachment = MediaAttachment::new(&field, &path);
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                attachment = attachment.with_file_name(name);
            }
            if let Some(mime) = mime_for(file) {
                attachment = attachment.with_mime_type(mime);
            }
            if let Ok(meta) = std::fs::metadata(file) {
                attachment = attachment.with_byte_size(meta.len());
            }
            Ok(attachment)
        })
        .collect()
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn args(fields: &[&str], other: &[&str]) -> FieldArgs {
        FieldArgs {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            other: other.iter().map(|s| s.to_string()).collect(),
            ..FieldArgs::default()
        }
    }

    #[test]
    fn text_date_and_flag_fields() {
        let input = FieldArgs {
            fields: vec!["surname=Okafor".into(), "address=12 Market Rd, Ikeja".into()],
            dates: vec!["dateOfBirth=1985-03-09".into()],
            flags: vec!["livestock_keeper=TRUE".into()],
            ..FieldArgs::default()
        };
        let fields = input.to_fields().unwrap();
        assert_eq!(fields["surname"], FieldValue::text("Okafor"));
        assert_eq!(fields["address"], FieldValue::text("12 Market Rd, Ikeja"));
        assert_eq!(fields["dateOfBirth"], FieldValue::Date(date!(1985 - 03 - 09)));
        assert_eq!(fields["livestock_keeper"], FieldValue::Flag(true));
    }

    #[test]
    fn other_option_takes_free_text() {
        let fields = args(&["tagging_location=Other"], &["tagging_location=Kaduna ranch"])
            .to_fields()
            .unwrap();
        assert_eq!(fields["tagging_location"], FieldValue::text("Kaduna ranch"));
    }

    #[test]
    fn other_without_text_is_empty() {
        let fields = args(&["tagging_location=other"], &[]).to_fields().unwrap();
        assert!(fields["tagging_location"].is_empty());
    }

    #[test]
    fn blank_other_text_is_empty() {
        let fields = args(&["tagging_location=Other"], &["tagging_location=   "])
            .to_fields()
            .unwrap();
        assert_eq!(fields["tagging_location"], FieldValue::text(""));
        let fields = args(&[], &["production_type= "]).to_fields().unwrap();
        assert!(fields["production_type"].is_empty());
    }

    #[test]
    fn other_text_alone_implies_other() {
        let fields = args(&[], &["production_type=Draught"]).to_fields().unwrap();
        assert_eq!(fields["production_type"], FieldValue::text("Draught"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        let err = args(&["surname"], &[]).to_fields().unwrap_err();
        assert_eq!(err.user_message(), "expected NAME=VALUE, got 'surname'");
        let bad_date = FieldArgs {
            dates: vec!["dob=09/03/1985".into()],
            ..FieldArgs::default()
        };
        assert!(bad_date.to_fields().is_err());
    }

    #[test]
    fn attachment_name_and_type_come_from_path() {
        let list = attachments(&["muzzle_photo=/tmp/cow-17.PNG".into()]).unwrap();
        assert_eq!(list[0].field, "muzzle_photo");
        assert_eq!(list[0].file_name, "cow-17.PNG");
        assert_eq!(list[0].mime_type, "image/png");
    }
}
