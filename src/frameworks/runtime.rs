// Process bootstrap shared by the server and viewer binaries.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Installs logging and the panic hook. `service` names the binary in every startup and
/// panic record; `default_directives` applies when `RUST_LOG` is unset.
pub fn init_runtime(service: &'static str, default_directives: &str) {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = env_filter(default_directives);

    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init(),
    }

    std::panic::set_hook(Box::new(move |info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(service, %info, ?backtrace, "panic");
    }));

    tracing::info!(service, ?format, "logging initialized");
}
