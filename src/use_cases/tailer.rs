// Incremental reader for the watched log file.

use crate::domain::{BuildingStateStore, Clock, EventExtractor, EventSink, GameEvent, WatchError};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Longest unterminated line kept between polls before it is discarded.
pub const MAX_CARRY_BYTES: usize = 64 * 1024;

/// Offset of the first byte of the watched file that has not been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    offset: u64,
}

impl Cursor {
    pub fn at(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of bytes appended past the cursor, if the file grew.
    pub fn pending(&self, size: u64) -> Option<u64> {
        (size > self.offset).then(|| size - self.offset)
    }

    pub fn advance(&mut self, bytes: u64) {
        self.offset += bytes;
    }

    pub fn reset_to(&mut self, offset: u64) {
        self.offset = offset;
    }
}

/// Collaborators shared by every tailer the watcher spawns.
#[derive(Clone)]
pub struct TailerDeps {
    pub extractor: Arc<dyn EventExtractor>,
    pub sink: Arc<dyn EventSink>,
    pub clock: Arc<dyn Clock>,
}

/// Owns the cursor and the building store for one watched file.
pub struct LogTailer {
    path: PathBuf,
    cursor: Cursor,
    // Bytes after the last newline of the previous read.
    carry: Vec<u8>,
    store: BuildingStateStore,
    deps: TailerDeps,
}

/// Returns the current size of a watchable log file.
pub async fn inspect_log_file(path: &Path) -> Result<u64, WatchError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(WatchError::NotAFile(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(WatchError::NotFound(path.to_path_buf()))
        }
        Err(source) => Err(WatchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl LogTailer {
    /// Positions the cursor at the current end of file. Content already in the file is never
    /// replayed, including when the same file is watched again.
    pub async fn open(
        path: impl Into<PathBuf>,
        dormancy: Duration,
        deps: TailerDeps,
    ) -> Result<Self, WatchError> {
        let path = path.into();
        let size = inspect_log_file(&path).await?;
        Ok(Self {
            path,
            cursor: Cursor::at(size),
            carry: Vec::new(),
            store: BuildingStateStore::new(dormancy),
            deps,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn store(&self) -> &BuildingStateStore {
        &self.store
    }

    /// Polls on a fixed cadence until `shutdown` is notified.
    pub async fn run(mut self, poll_interval: Duration, shutdown: Arc<Notify>) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(offset = self.cursor.offset(), "tailing from end of file");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                _ = interval.tick() => self.poll().await,
            }
        }

        debug!(
            offset = self.cursor.offset(),
            buildings = self.store.len(),
            "tailer stopped"
        );
    }

    /// Reads whatever was appended since the last poll, then evicts dormant buildings.
    pub async fn poll(&mut self) {
        match self.read_appended().await {
            Ok(bytes) if !bytes.is_empty() => self.consume(&bytes),
            Ok(_) => {}
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read log update");
            }
        }

        // Runs even when nothing was appended.
        let now = self.deps.clock.now_millis();
        for event in self.store.sweep(now) {
            debug!(kind = event.kind(), "building dormant; removing");
            self.deps.sink.publish(event);
        }
    }

    async fn read_appended(&mut self) -> io::Result<Vec<u8>> {
        let size = fs::metadata(&self.path).await?.len();
        if size < self.cursor.offset() {
            debug!(
                size,
                offset = self.cursor.offset(),
                "log file shrank; skipping to new end"
            );
            self.cursor.reset_to(size);
            self.carry.clear();
            return Ok(Vec::new());
        }
        let Some(pending) = self.cursor.pending(size) else {
            return Ok(Vec::new());
        };

        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.cursor.offset())).await?;
        let mut buf = Vec::with_capacity(usize::try_from(pending).unwrap_or(0));
        file.take(pending).read_to_end(&mut buf).await?;

        // Advance before parsing so a bad line can never be read twice.
        self.cursor.advance(buf.len() as u64);
        Ok(buf)
    }

    fn consume(&mut self, bytes: &[u8]) {
        self.carry.extend_from_slice(bytes);

        if let Some(last_newline) = self.carry.iter().rposition(|b| *b == b'\n') {
            let complete: Vec<u8> = self.carry.drain(..=last_newline).collect();
            for raw in complete.split(|b| *b == b'\n') {
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                if raw.is_empty() {
                    continue;
                }
                self.dispatch(&String::from_utf8_lossy(raw));
            }
        }

        if self.carry.len() > MAX_CARRY_BYTES {
            warn!(
                bytes = self.carry.len(),
                "unterminated line exceeds carry limit; dropping"
            );
            self.carry.clear();
        }
    }

    fn dispatch(&mut self, line: &str) {
        let Some(event) = self.deps.extractor.extract(line) else {
            return;
        };

        if let GameEvent::BuildingDamage(damage) = &event {
            self.store.upsert(damage, self.deps.clock.now_millis());
        }

        debug!(kind = event.kind(), "extracted event");
        self.deps.sink.publish(event);
    }
}
