// Start/stop control for the single log tailing task.

use crate::domain::{GameEvent, WatchError};
use crate::use_cases::tailer::{LogTailer, TailerDeps, inspect_log_file};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

/// Shared configuration for spawned tailers.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Cadence of the poll loop.
    pub poll_interval: Duration,
    /// Silence after which a repaired building is forgotten.
    pub building_dormancy: Duration,
}

/// Returned when a watch has started.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchStarted {
    pub path: PathBuf,
    /// True when an earlier watch was cancelled to make room for this one.
    pub replaced: bool,
}

impl std::fmt::Display for WatchStarted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Started watching file: {}", self.path.display())
    }
}

struct ActiveWatch {
    path: PathBuf,
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// Owns at most one running tailer. Start and stop are serialized by an async mutex so the old
/// task has fully exited before a new one polls.
pub struct LogWatcher {
    settings: WatchSettings,
    deps: TailerDeps,
    active: Mutex<Option<ActiveWatch>>,
}

impl LogWatcher {
    pub fn new(settings: WatchSettings, deps: TailerDeps) -> Self {
        Self {
            settings,
            deps,
            active: Mutex::new(None),
        }
    }

    /// Starts tailing `path` from its current end, replacing any running watch.
    ///
    /// A missing file fails without touching the running watch. When a watch is replaced, the
    /// building state is dropped and a single `BuildingClear` is published before the new task
    /// starts.
    pub async fn start(&self, path: impl Into<PathBuf>) -> Result<WatchStarted, WatchError> {
        let path = path.into();
        let mut active = self.active.lock().await;

        inspect_log_file(&path).await?;

        let replaced = match active.take() {
            Some(previous) => {
                self.halt(previous).await;
                true
            }
            None => false,
        };

        let tailer = LogTailer::open(&path, self.settings.building_dormancy, self.deps.clone())
            .await?;
        let shutdown = Arc::new(Notify::new());
        let span = info_span!("watch", path = %path.display());
        let handle = tokio::spawn(
            tailer
                .run(self.settings.poll_interval, shutdown.clone())
                .instrument(span),
        );

        info!(path = %path.display(), replaced, "started watching log file");
        *active = Some(ActiveWatch {
            path: path.clone(),
            shutdown,
            handle,
        });

        Ok(WatchStarted { path, replaced })
    }

    /// Stops the running watch, if any. Returns whether something was stopped.
    ///
    /// Once this returns, no further events are published for the old file.
    pub async fn stop(&self) -> bool {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(previous) => {
                let path = previous.path.clone();
                self.halt(previous).await;
                info!(path = %path.display(), "stopped watching log file");
                true
            }
            None => false,
        }
    }

    pub async fn current_path(&self) -> Option<PathBuf> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|watch| watch.path.clone())
    }

    // Cancels the task, waits for it to exit, then announces the reset. The store goes away
    // together with the tailer that owned it.
    async fn halt(&self, watch: ActiveWatch) {
        watch.shutdown.notify_one();
        if let Err(error) = watch.handle.await {
            warn!(path = %watch.path.display(), %error, "tailer task ended abnormally");
        }
        self.deps.sink.publish(GameEvent::BuildingClear);
    }
}

impl std::fmt::Debug for LogWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerSighting;
    use crate::interface_adapters::log_format::ScoutReportExtractor;
    use crate::use_cases::test_support::{ManualClock, RecordingSink, scratch_log_path};
    use std::io::Write;
    use std::path::Path;
    use std::time::Instant;

    fn watcher(sink: &RecordingSink) -> LogWatcher {
        LogWatcher::new(
            WatchSettings {
                poll_interval: Duration::from_millis(10),
                building_dormancy: Duration::from_secs(180),
            },
            TailerDeps {
                extractor: Arc::new(ScoutReportExtractor),
                sink: Arc::new(sink.clone()),
                clock: Arc::new(ManualClock::at(0)),
            },
        )
    }

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open log for append");
        file.write_all(text.as_bytes()).expect("append to log");
    }

    async fn wait_for_events(sink: &RecordingSink, count: usize) -> Vec<GameEvent> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let events = sink.events();
            if events.len() >= count || Instant::now() > deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn sighting(name: &str) -> String {
        format!("Разведчики засекли игрока {name} на координатах 1,2,3\n")
    }

    #[tokio::test]
    async fn missing_file_is_rejected_and_nothing_runs() {
        let sink = RecordingSink::default();
        let watcher = watcher(&sink);
        let path = scratch_log_path();

        let result = watcher.start(&path).await;

        assert!(matches!(result, Err(WatchError::NotFound(_))));
        assert_eq!(watcher.current_path().await, None);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn started_watch_publishes_appended_sightings() {
        let sink = RecordingSink::default();
        let watcher = watcher(&sink);
        let path = scratch_log_path();
        std::fs::write(&path, sighting("Old")).expect("seed log");

        let started = watcher.start(&path).await.expect("start watch");
        assert!(!started.replaced);
        assert_eq!(
            started.to_string(),
            format!("Started watching file: {}", path.display())
        );
        assert_eq!(watcher.current_path().await, Some(path.clone()));

        append(&path, &sighting("New"));
        let events = wait_for_events(&sink, 1).await;

        assert_eq!(
            events,
            vec![GameEvent::PlayerPosition(PlayerSighting {
                name: "New".to_string(),
                x: 1.0,
                y: Some(2.0),
                z: 3.0,
            })]
        );
        watcher.stop().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn restart_clears_buildings_and_ignores_old_target() {
        let sink = RecordingSink::default();
        let watcher = watcher(&sink);
        let first = scratch_log_path();
        let second = scratch_log_path();
        std::fs::write(&first, "").expect("seed first log");
        std::fs::write(&second, "").expect("seed second log");

        watcher.start(&first).await.expect("start first watch");
        let started = watcher.start(&second).await.expect("start second watch");
        assert!(started.replaced);
        assert_eq!(sink.take(), vec![GameEvent::BuildingClear]);

        append(&first, &sighting("Ghost"));
        append(&second, &sighting("Live"));
        let events = wait_for_events(&sink, 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&sink.events()[..], [GameEvent::PlayerPosition(p)] if p.name == "Live"));

        watcher.stop().await;
        let _ = std::fs::remove_file(&first);
        let _ = std::fs::remove_file(&second);
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_silences_the_tailer() {
        let sink = RecordingSink::default();
        let watcher = watcher(&sink);
        let path = scratch_log_path();
        std::fs::write(&path, "").expect("seed log");

        assert!(!watcher.stop().await);
        watcher.start(&path).await.expect("start watch");

        assert!(watcher.stop().await);
        assert!(!watcher.stop().await);
        assert_eq!(sink.take(), vec![GameEvent::BuildingClear]);

        append(&path, &sighting("Late"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sink.events().is_empty());
        assert_eq!(watcher.current_path().await, None);
        let _ = std::fs::remove_file(&path);
    }
}
