use color_eyre::Result;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Keeps two harvest processes from interleaving writes against the same
/// collection. Creating the lock file fails when it already exists; the
/// holder's PID is written inside so the error can name it. The file is
/// removed on drop, which also covers error returns.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                color_eyre::eyre::eyre!(
                    "Failed to create lock directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(e) = write!(file, "{}", std::process::id()) {
                    warn!("Failed to record PID in lock file: {}", e);
                }
                debug!(operation = "lock_acquired", path = %path.display(), "Acquired run lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&path).unwrap_or_default();
                let holder = holder.trim();
                if holder.is_empty() {
                    Err(color_eyre::eyre::eyre!(
                        "Another harvest appears to be running (lock file {} exists). If none is, delete the file and retry.",
                        path.display()
                    ))
                } else {
                    Err(color_eyre::eyre::eyre!(
                        "Another harvest appears to be running (lock file {} held by PID {}). If none is, delete the file and retry.",
                        path.display(),
                        holder
                    ))
                }
            }
            Err(e) => Err(color_eyre::eyre::eyre!(
                "Failed to create lock file {}: {}",
                path.display(),
                e
            )),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                "Failed to remove lock file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
