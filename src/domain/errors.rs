use std::path::PathBuf;

// Errors surfaced synchronously to whoever asked to start a watch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("failed to inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
