//! Staging, resuming, submitting, and abandoning a flow.

use ranch_forms::{FlowKind, StepPayload};
use ranch_session::{FlowError, SubmitOutcome};
use serde_json::{json, Map, Value};

use crate::context::Context;
use crate::input::{self, FieldArgs};
use crate::OutputFormat;

pub(crate) fn cmd_flows(ctx: &Context) {
    let flows: Vec<_> = FlowKind::ALL.iter().map(|k| (*k, k.definition())).collect();
    match ctx.output {
        OutputFormat::Json => {
            let items: Vec<_> = flows
                .iter()
                .map(|(kind, def)| {
                    let steps: Vec<_> = def
                        .steps
                        .iter()
                        .map(|s| {
                            json!({
                                "key": s.session_key,
                                "submit": def.is_submit_step(&s.session_key),
                                "required": s.fields.iter().filter(|f| f.required).map(|f| &f.name).collect::<Vec<_>>(),
                                "optional": s.fields.iter().filter(|f| !f.required).map(|f| &f.name).collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    json!({
                        "flow": kind.as_str(),
                        "endpoint": ctx.api.endpoints().path_for(&def.endpoint),
                        "steps": steps,
                        "uploads": def.attachments.iter().map(|a| &a.field).collect::<Vec<_>>(),
                    })
                })
                .collect();
            ctx.emit(&json!(items));
        }
        OutputFormat::Text => {
            for (kind, def) in &flows {
                ctx.say(format!("{} -> {}", kind, ctx.api.endpoints().path_for(&def.endpoint)));
                for step in &def.steps {
                    let marker = if def.is_submit_step(&step.session_key) { " (submit)" } else { "" };
                    ctx.say(format!("  {}{}", step.session_key, marker));
                    for f in &step.fields {
                        let req = if f.required { "*" } else { " " };
                        ctx.say(format!("    {} {}", req, f.name));
                    }
                }
                for slot in &def.attachments {
                    ctx.say(format!("  upload: {}", slot.field));
                }
            }
        }
    }
}

pub(crate) async fn cmd_stage(ctx: &Context, flow: FlowKind, step: &str, args: &FieldArgs) -> Result<(), FlowError> {
    let fields = args.to_fields()?;
    let session = ctx.session(flow);
    session.advance(step, fields).await?;

    let next = session
        .flow()
        .step(step)
        .and_then(|(i, _)| session.flow().steps.get(i + 1))
        .map(|s| s.session_key.clone());
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!({ "flow": flow.as_str(), "staged": step, "next": next })),
        OutputFormat::Text => {
            ctx.say(format!("staged {} for {}", step, flow));
            match next {
                Some(key) if session.flow().is_submit_step(&key) => {
                    ctx.say(format!("  next: ranch submit {} (step '{}')", flow, key))
                }
                Some(key) => ctx.say(format!("  next: ranch stage {} {}", flow, key)),
                None => {}
            }
        }
    }
    Ok(())
}

fn payload_json(payload: &StepPayload) -> Value {
    let fields: Map<String, Value> = payload
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.to_wire())))
        .collect();
    json!({
        "key": payload.session_key,
        "created_at": payload.created_at,
        "fields": fields,
    })
}

pub(crate) async fn cmd_resume(ctx: &Context, flow: FlowKind, step: &str) -> Result<(), FlowError> {
    let payloads = ctx.session(flow).resume(step).await?;
    match ctx.output {
        OutputFormat::Json => {
            let items: Vec<_> = payloads.iter().map(payload_json).collect();
            ctx.emit(&json!(items));
        }
        OutputFormat::Text => {
            if payloads.is_empty() {
                ctx.say(format!("nothing is staged before {}", step));
            }
            for payload in &payloads {
                ctx.say(format!("{} (staged {})", payload.session_key, payload.created_at));
                for (name, value) in &payload.fields {
                    ctx.say(format!("  {} = {}", name, value));
                }
            }
        }
    }
    Ok(())
}

pub(crate) async fn cmd_submit(
    ctx: &Context,
    flow: FlowKind,
    args: &FieldArgs,
    uploads: &[String],
) -> Result<(), FlowError> {
    let fields = args.to_fields()?;
    let attachments = input::attachments(uploads)?;
    let outcome = ctx.session(flow).submit(fields, attachments).await?;

    match outcome {
        SubmitOutcome::Confirmed(confirmation) => match ctx.output {
            OutputFormat::Json => ctx.emit(&json!({
                "flow": confirmation.flow,
                "submitted": true,
                "params": confirmation.params,
                "response": confirmation.response,
            })),
            OutputFormat::Text => {
                ctx.say(format!("{} registration submitted", confirmation.flow));
                for (name, value) in &confirmation.params {
                    ctx.say(format!("  {}: {}", name, value));
                }
                if let Some(msg) = confirmation.response.get("message").and_then(Value::as_str) {
                    ctx.say(format!("  server: {}", msg));
                }
            }
        },
        SubmitOutcome::Ignored => ctx.say("a submission is already in progress"),
        SubmitOutcome::Discarded => ctx.say("submission result discarded"),
    }
    Ok(())
}

pub(crate) async fn cmd_abandon(ctx: &Context, flow: FlowKind) -> Result<(), FlowError> {
    ctx.session(flow).abandon().await?;
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!({ "flow": flow.as_str(), "abandoned": true })),
        OutputFormat::Text => ctx.say(format!("discarded staged steps for {}", flow)),
    }
    Ok(())
}
