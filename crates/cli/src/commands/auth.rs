use ranch_session::{auth, FlowError};
use serde_json::json;

use crate::context::Context;
use crate::OutputFormat;

pub(crate) async fn cmd_login(ctx: &Context, email: &str, password: &str) -> Result<(), FlowError> {
    let response = auth::login(ctx.kv(), &ctx.api, email, password).await?;
    let name = response
        .user
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(email.trim());
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!({ "logged_in": true, "user": response.user })),
        OutputFormat::Text => ctx.say(format!("logged in as {}", name)),
    }
    Ok(())
}

pub(crate) async fn cmd_logout(ctx: &Context) -> Result<(), FlowError> {
    auth::logout(ctx.kv()).await?;
    match ctx.output {
        OutputFormat::Json => ctx.emit(&json!({ "logged_in": false })),
        OutputFormat::Text => ctx.say("logged out"),
    }
    Ok(())
}
