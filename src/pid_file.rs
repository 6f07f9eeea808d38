// src/pid_file.rs

use crate::error::{AppError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes the current process id to `path`, replacing any previous content.
pub fn write_pid_file(path: &Path) -> Result<()> {
    let pid = std::process::id().to_string();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o660);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(pid.as_bytes()))
        .map_err(|e| AppError::PidFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    info!(pid_file = %path.display(), pid = %pid, "Wrote pid file");
    Ok(())
}

/// Best-effort removal on shutdown.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(pid_file = %path.display(), error = %e, "Failed to remove pid file");
    }
}

/// A written pid file, removed again when the guard is dropped.
///
/// Holding the guard in `main` covers every exit path after the file was
/// written, including failures to bind the listener.
#[derive(Debug)]
pub struct PidFileGuard {
    path: PathBuf,
}

impl PidFileGuard {
    pub fn create(path: &Path) -> Result<Self> {
        write_pid_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        remove_pid_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drroute.pid");

        write_pid_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());

        remove_pid_file(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_overwrites_stale_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drroute.pid");
        std::fs::write(&path, "999999999999").unwrap();

        write_pid_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), std::process::id().to_string());
    }

    #[test]
    fn test_guard_removes_file_on_early_return() {
        fn bind_fails(path: &Path) -> Result<()> {
            let _guard = PidFileGuard::create(path)?;
            assert!(path.exists());
            Err(AppError::Io {
                operation: "bind".into(),
                message: "address in use".into(),
            })
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("drroute.pid");

        assert!(bind_fails(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_guard_failure_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("drroute.pid");

        assert!(PidFileGuard::create(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("drroute.pid");

        let err = write_pid_file(&path).unwrap_err();
        assert!(matches!(err, AppError::PidFile { .. }));
    }
}
