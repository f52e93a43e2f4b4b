mod commands;
mod context;
mod input;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ranch_client::ReportKind;
use ranch_forms::FlowKind;
use ranch_session::{FlowError, Route};

use crate::context::Context;
use crate::input::FieldArgs;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Livestock registration field client.
#[derive(Parser)]
#[command(name = "ranch", version, about = "Livestock registration field client")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Client configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local session store
    #[arg(long, global = true, default_value = ".ranch/store.json")]
    store: PathBuf,

    /// Override the API base URL from the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the credential locally
    Login {
        #[arg(long)]
        email: String,
        /// Password; read from RANCH_PASSWORD when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove the stored credential and profile
    Logout,

    /// List states, or the LGAs of one state
    Regions {
        /// State id or name whose LGAs to list
        #[arg(long)]
        state: Option<String>,
    },

    /// List the registration flows and their steps
    Flows,

    /// Validate a step and stage it locally
    Stage {
        /// keeper, owner, location, or tag
        flow: FlowKind,
        /// Staging key of the step
        step: String,
        #[command(flatten)]
        input: FieldArgs,
    },

    /// Show what is staged before a step
    Resume {
        flow: FlowKind,
        step: String,
    },

    /// Validate the final step, merge staged steps, and submit
    Submit {
        flow: FlowKind,
        #[command(flatten)]
        input: FieldArgs,
        /// Photo or document for an upload slot
        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attachments: Vec<String>,
    },

    /// Discard a flow's staged steps
    Abandon { flow: FlowKind },

    /// Counts for today, the last week, and the last month
    Dashboard,

    /// List registered records
    Reports {
        /// keepers, owners, locations, or tagged
        kind: ReportKind,
    },

    /// Sign-in state and every staged step
    Status,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let output = cli.output;
    let quiet = cli.quiet;

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let ctx = match rt.block_on(Context::open(
        cli.config.as_deref(),
        &cli.store,
        cli.api_url.as_deref(),
        output,
        quiet,
    )) {
        Ok(ctx) => ctx,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Login { email, password } => {
                let password = password
                    .or_else(|| std::env::var("RANCH_PASSWORD").ok())
                    .unwrap_or_default();
                commands::auth::cmd_login(&ctx, &email, &password).await
            }
            Commands::Logout => commands::auth::cmd_logout(&ctx).await,
            Commands::Regions { state } => commands::regions::cmd_regions(&ctx, state.as_deref()).await,
            Commands::Flows => {
                commands::flow::cmd_flows(&ctx);
                Ok(())
            }
            Commands::Stage { flow, step, input } => {
                commands::flow::cmd_stage(&ctx, flow, &step, &input).await
            }
            Commands::Resume { flow, step } => commands::flow::cmd_resume(&ctx, flow, &step).await,
            Commands::Submit {
                flow,
                input,
                attachments,
            } => commands::flow::cmd_submit(&ctx, flow, &input, &attachments).await,
            Commands::Abandon { flow } => commands::flow::cmd_abandon(&ctx, flow).await,
            Commands::Dashboard => commands::dashboard::cmd_dashboard(&ctx).await,
            Commands::Reports { kind } => commands::reports::cmd_reports(&ctx, kind).await,
            Commands::Status => commands::status::cmd_status(&ctx).await,
        }
    });

    if let Err(e) = result {
        report_flow_error(&e, output, quiet);
        process::exit(1);
    }
}

/// Print a session failure with where the user should go next.
fn report_flow_error(err: &FlowError, output: OutputFormat, quiet: bool) {
    let next = match err.route() {
        Route::Stay => None,
        Route::Login => Some("run `ranch login`".to_string()),
        Route::Step(key) => Some(format!("re-enter step '{}'", key)),
    };
    match output {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "error": err.user_message(),
                "next": next,
            });
            eprintln!("{}", body);
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            eprintln!("error: {}", err.user_message());
            if let Some(next) = next {
                eprintln!("  next: {}", next);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
