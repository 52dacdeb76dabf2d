// Framework bootstrap for the headless viewer.

use crate::frameworks::config;
use crate::frameworks::runtime::init_runtime;
use crate::interface_adapters::utils::clock::SystemClock;
use crate::interface_adapters::viewer::{MapViewer, ViewerSettings};
use crate::use_cases::reconciler::ReconcilerSettings;

use std::sync::Arc;
use tokio::sync::Notify;

pub async fn run_viewer_with_config() {
    init_runtime("scout_viewer", config::VIEWER_LOG_DIRECTIVES);

    let settings = ViewerSettings {
        url: config::viewer_ws_url(),
        reconnect_delay: config::VIEWER_RECONNECT_DELAY,
        player_sweep_every: config::PLAYER_SWEEP_INTERVAL,
        building_sweep_every: config::BUILDING_SWEEP_INTERVAL,
        reconciler: ReconcilerSettings {
            player_timeout: config::PLAYER_TIMEOUT,
            building_dormancy: config::building_dormancy(),
            cluster_radius: config::CLUSTER_RADIUS,
        },
    };
    tracing::info!(url = %settings.url, "viewer starting");

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal.notify_one(),
            Err(error) => tracing::warn!(%error, "failed to listen for ctrl-c"),
        }
    });

    MapViewer::new(settings, Arc::new(SystemClock))
        .run(shutdown)
        .await;
}
