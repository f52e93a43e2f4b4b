use ranch_forms::{DashboardSummary, FlowKind};
use ranch_session::{staged_entries, FlowError};
use ranch_storage::keys::{DASHBOARD_SUMMARY, USER_PROFILE, USER_TOKEN};
use serde_json::{json, Value};

use crate::context::Context;
use crate::OutputFormat;

/// The flow a staging key belongs to, if it is one of the built-in flows.
fn owning_flow(key: &str) -> Option<FlowKind> {
    FlowKind::ALL
        .into_iter()
        .find(|k| k.definition().staged_keys().contains(&key))
}

pub(crate) async fn cmd_status(ctx: &Context) -> Result<(), FlowError> {
    let store = ctx.kv();
    let logged_in = store
        .get(USER_TOKEN)
        .await?
        .is_some_and(|t| !t.trim().is_empty());
    let user = store
        .get(USER_PROFILE)
        .await?
        .and_then(|p| serde_json::from_str::<Value>(&p).ok())
        .and_then(|p| p.get("name").and_then(Value::as_str).map(str::to_string));
    let cached = store
        .get(DASHBOARD_SUMMARY)
        .await?
        .and_then(|s| DashboardSummary::from_json(&s).ok());
    let entries = staged_entries(store).await?;

    match ctx.output {
        OutputFormat::Json => {
            let staged: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "key": e.key,
                        "flow": owning_flow(&e.key).map(FlowKind::as_str),
                        "created_at": e.created_at,
                        "fields": e.field_count,
                    })
                })
                .collect();
            ctx.emit(&json!({
                "logged_in": logged_in,
                "user": user,
                "staged": staged,
                "dashboard_cached_at": cached.map(|c| c.last_updated),
            }));
        }
        OutputFormat::Text => {
            match (logged_in, &user) {
                (true, Some(name)) => ctx.say(format!("logged in as {}", name)),
                (true, None) => ctx.say("logged in"),
                (false, _) => ctx.say("not logged in"),
            }
            if entries.is_empty() {
                ctx.say("no staged steps");
            } else {
                ctx.say(format!("staged steps ({}):", entries.len()));
                for e in &entries {
                    let flow = owning_flow(&e.key).map(FlowKind::as_str).unwrap_or("?");
                    ctx.say(format!(
                        "  {:<22} {:<8} {} fields, staged {}",
                        e.key, flow, e.field_count, e.created_at
                    ));
                }
            }
            if let Some(summary) = cached {
                ctx.say(format!("dashboard cached at {}", summary.last_updated));
            }
        }
    }
    Ok(())
}
