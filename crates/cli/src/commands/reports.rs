use ranch_client::ReportKind;
use ranch_session::{load_report, FlowError};
use serde_json::{json, Value};

use crate::context::Context;
use crate::OutputFormat;

pub(crate) async fn cmd_reports(ctx: &Context, kind: ReportKind) -> Result<(), FlowError> {
    let records = load_report(ctx.kv(), &ctx.api, kind).await?;
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!(records)),
        OutputFormat::Text => {
            ctx.say(format!("{} ({})", kind, records.len()));
            for record in &records {
                ctx.say(format!("  {:>6}  {}", text(record, "id"), label(kind, record)));
            }
        }
    }
    Ok(())
}

/// The headline shown for one record.
fn label(kind: ReportKind, record: &Value) -> String {
    let joined = |keys: &[&str]| {
        keys.iter()
            .map(|k| text(record, k))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };
    match kind {
        ReportKind::Keepers | ReportKind::Locations => {
            let name = text(record, "name");
            if name.is_empty() {
                joined(&["surname", "other_names"])
            } else {
                name
            }
        }
        ReportKind::Owners => joined(&["surname", "other_names"]),
        ReportKind::Tagged => {
            let details = joined(&["animal_type", "breed"]);
            if details.is_empty() {
                format!("tag {}", text(record, "tag_id"))
            } else {
                format!("tag {} ({})", text(record, "tag_id"), details)
            }
        }
    }
}

fn text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_per_report() {
        let owner = json!({"id": 3, "surname": "Bello", "other_names": "Musa"});
        assert_eq!(label(ReportKind::Owners, &owner), "Bello Musa");
        assert_eq!(label(ReportKind::Keepers, &owner), "Bello Musa");

        let location = json!({"id": 8, "name": "Kaduna ranch"});
        assert_eq!(label(ReportKind::Locations, &location), "Kaduna ranch");

        let tag = json!({"id": 4, "tag_id": "NG-4", "animal_type": "Cattle", "breed": null});
        assert_eq!(label(ReportKind::Tagged, &tag), "tag NG-4 (Cattle)");
        assert_eq!(text(&tag, "id"), "4");
    }
}
