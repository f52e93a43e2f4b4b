use ranch_forms::{DashboardSummary, PeriodCounts};
use ranch_session::{load_dashboard, FlowError};
use serde_json::json;
use time::OffsetDateTime;

use crate::context::Context;
use crate::OutputFormat;

pub(crate) async fn cmd_dashboard(ctx: &Context) -> Result<(), FlowError> {
    let summary = load_dashboard(ctx.kv(), &ctx.api, OffsetDateTime::now_utc()).await?;
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!(summary)),
        OutputFormat::Text => print_table(ctx, &summary),
    }
    Ok(())
}

fn print_table(ctx: &Context, summary: &DashboardSummary) {
    let row = |label: &str, pick: fn(&PeriodCounts) -> usize| {
        format!(
            "{:<8} {:>7} {:>7} {:>7}",
            label,
            pick(&summary.today),
            pick(&summary.week),
            pick(&summary.month)
        )
    };
    ctx.say(format!("{:<8} {:>7} {:>7} {:>7}", "", "today", "week", "month"));
    ctx.say(row("tagged", |c| c.tagged));
    ctx.say(row("owners", |c| c.owners));
    ctx.say(row("keepers", |c| c.keepers));
    ctx.say(row("exited", |c| c.exited));
    if summary.stale {
        ctx.say(format!("(offline: showing counts from {})", summary.last_updated));
    } else {
        ctx.say(format!("updated {}", summary.last_updated));
    }
}
