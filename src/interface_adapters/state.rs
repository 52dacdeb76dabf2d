use crate::interface_adapters::broadcast::Broadcaster;
use crate::interface_adapters::paths::PathResolver;
use crate::use_cases::watch::LogWatcher;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Single tailing task, restarted per watch request.
    pub watcher: Arc<LogWatcher>,
    // Registry of connected viewers; also the watcher's event sink.
    pub broadcaster: Arc<Broadcaster>,
    pub resolver: PathResolver,
}
