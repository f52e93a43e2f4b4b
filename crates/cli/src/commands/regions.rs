use ranch_forms::{CascadeStatus, Choice};
use ranch_session::{load_regions, FlowError};
use serde_json::json;

use crate::context::Context;
use crate::OutputFormat;

/// Print the states, or with `state` the LGAs under it.
pub(crate) async fn cmd_regions(ctx: &Context, state: Option<&str>) -> Result<(), FlowError> {
    let mut select = load_regions(ctx.kv(), &ctx.api).await?;

    let (choices, heading) = match state {
        None => (select.parent_options(), "states".to_string()),
        Some(state) => {
            select.set_parent(state);
            if select.status() == CascadeStatus::Empty {
                return Err(FlowError::Input(select.placeholder().to_string()));
            }
            (select.child_options().to_vec(), format!("LGAs of {}", state))
        }
    };
    print_choices(ctx, &heading, &choices);
    Ok(())
}

fn print_choices(ctx: &Context, heading: &str, choices: &[Choice]) {
    match ctx.output {
        OutputFormat::Json => {
            let items: Vec<_> = choices
                .iter()
                .map(|c| json!({ "value": c.value, "label": c.label }))
                .collect();
            ctx.emit(&json!(items));
        }
        OutputFormat::Text => {
            ctx.say(format!("{} ({})", heading, choices.len()));
            for c in choices {
                ctx.say(format!("  {:>6}  {}", c.value, c.label));
            }
        }
    }
}
