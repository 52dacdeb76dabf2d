use std::{env, path::PathBuf, time::Duration};

// Runtime/server constants (not map tuning).

pub fn http_host() -> String {
    env::var("MAP_SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn http_port() -> u16 {
    env::var("MAP_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
}

pub fn poll_interval() -> Duration {
    let millis = env::var("LOG_POLL_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(50);
    Duration::from_millis(millis)
}

pub fn building_dormancy() -> Duration {
    let secs = env::var("BUILDING_DORMANCY_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(180);
    Duration::from_secs(secs)
}

// Watch target to start tailing at boot, if any.
pub fn initial_log_file() -> Option<String> {
    non_empty_var("WATCH_LOG_FILE")
}

pub fn host_users_mount() -> Option<PathBuf> {
    non_empty_var("HOST_USERS_MOUNT").map(PathBuf::from)
}

pub fn viewer_ws_url() -> String {
    non_empty_var("VIEWER_WS_URL").unwrap_or_else(|| "ws://127.0.0.1:5000/ws/".to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub const SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

pub const PLAYER_TIMEOUT: Duration = Duration::from_secs(10);
pub const PLAYER_SWEEP_INTERVAL: Duration = Duration::from_secs(2);
pub const BUILDING_SWEEP_INTERVAL: Duration = Duration::from_secs(5);
pub const CLUSTER_RADIUS: f64 = 15.0;
pub const VIEWER_RECONNECT_DELAY: Duration = Duration::from_secs(2);

// Used when RUST_LOG is unset. The viewer prints each rendered marker at debug.
pub const SERVER_LOG_DIRECTIVES: &str = "info";
pub const VIEWER_LOG_DIRECTIVES: &str = "info,scout_map::interface_adapters::viewer=debug";
