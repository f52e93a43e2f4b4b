use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,ranch_cli=debug,ranch_session=debug,ranch_client=debug,ranch_storage=debug";

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub(crate) fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
