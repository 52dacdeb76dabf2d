// Translation of client-supplied log paths into paths readable by this process.

use std::path::PathBuf;

const WINDOWS_USERS_PREFIX: &str = "C:\\Users\\";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Invalid logFilePath")]
    Empty,
}

/// Rewrites Windows user-profile paths onto a host mount when the server runs in a container.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    users_mount: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(users_mount: Option<PathBuf>) -> Self {
        Self { users_mount }
    }

    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let Some(mount) = &self.users_mount else {
            return Ok(PathBuf::from(raw));
        };

        // Prefix match is case-insensitive, like Windows itself.
        match raw.get(..WINDOWS_USERS_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(WINDOWS_USERS_PREFIX) => {
                let rest = raw[WINDOWS_USERS_PREFIX.len()..].replace('\\', "/");
                Ok(mount.join(rest))
            }
            _ => Ok(PathBuf::from(raw)),
        }
    }
}
