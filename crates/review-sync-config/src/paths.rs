use anyhow::Result;
use dirs;
use std::path::{Path, PathBuf};

/// Base path inside a container, overridable through `REVIEWVAULT_BASE_PATH`
pub fn container_base_path() -> PathBuf {
    std::env::var("REVIEWVAULT_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("reviewvault");
        Ok(Self::rooted(base))
    }

    pub fn from_container_env() -> Self {
        Self::rooted(container_base_path())
    }

    // Config files sit at the base path, data and logs in subdirectories
    fn rooted(base: PathBuf) -> Self {
        Self {
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir.join("reviewvault.log")
    }

    /// Advisory lock taken for the duration of a harvesting process, so a
    /// second run cannot race the first against the same storage target.
    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join("harvest.lock")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.log_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container base directory is created by the Containerfile, so
        // its presence indicates a container environment
        let base = container_base_path();
        if base.exists() {
            return Self::from_container_env();
        }

        // Otherwise, use platform-specific paths (e.g., ~/.config/reviewvault on Linux)
        Self::new().unwrap_or_else(|_| Self::from_container_env())
    }
}
