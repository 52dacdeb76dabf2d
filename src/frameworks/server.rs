// Framework bootstrap for the map server runtime.

use crate::frameworks::config;
use crate::frameworks::runtime::init_runtime;
use crate::interface_adapters::broadcast::Broadcaster;
use crate::interface_adapters::log_format::ScoutReportExtractor;
use crate::interface_adapters::paths::PathResolver;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::clock::SystemClock;
use crate::use_cases::tailer::TailerDeps;
use crate::use_cases::watch::{LogWatcher, WatchSettings};

use std::{io::Result, sync::Arc};

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    autostart_watch(&state).await;

    let app = app(state);
    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime("scout_map", config::SERVER_LOG_DIRECTIVES);

    let address = format!("{}:{}", config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> AppState {
    let broadcaster = Arc::new(Broadcaster::new(config::SUBSCRIBER_CHANNEL_CAPACITY));
    let settings = WatchSettings {
        poll_interval: config::poll_interval(),
        building_dormancy: config::building_dormancy(),
    };
    tracing::debug!(
        poll_interval_ms = settings.poll_interval.as_millis(),
        building_dormancy_secs = settings.building_dormancy.as_secs(),
        "watch settings configured"
    );

    // The broadcaster doubles as the tailer's sink so every extracted event fans out.
    let watcher = LogWatcher::new(
        settings,
        TailerDeps {
            extractor: Arc::new(ScoutReportExtractor),
            sink: broadcaster.clone(),
            clock: Arc::new(SystemClock),
        },
    );

    AppState {
        watcher: Arc::new(watcher),
        broadcaster,
        resolver: PathResolver::new(config::host_users_mount()),
    }
}

// A bad boot-time target is logged and the server still starts idle.
async fn autostart_watch(state: &AppState) {
    let Some(raw) = config::initial_log_file() else {
        return;
    };

    let path = match state.resolver.resolve(&raw) {
        Ok(path) => path,
        Err(error) => {
            tracing::warn!(%error, "ignoring WATCH_LOG_FILE");
            return;
        }
    };

    match state.watcher.start(path).await {
        Ok(started) => tracing::info!(%started, "watching log file from boot"),
        Err(error) => tracing::warn!(%error, "failed to start boot-time watch"),
    }
}
