use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// MongoDB connection string. Credentials, if any, live inside the URI.
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the extractor endpoint serving feedback pages as JSON.
    pub endpoint: String,
    /// Seller profile slug whose feedback listing is harvested.
    pub profile: String,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_database() -> String {
    "reviewvault".to_string()
}

fn default_collection() -> String {
    "reviews".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_interval_minutes() -> u64 {
    360 // Every 6 hours
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        interval_minutes: default_interval_minutes(),
        run_on_startup: default_true(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Environment variables take precedence over file values for the
    /// storage target, so deployments can rotate credentials without
    /// rewriting the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            if !uri.is_empty() {
                self.storage.uri = uri;
            }
        }
        if let Ok(database) = std::env::var("MONGODB_DBNAME") {
            if !database.is_empty() {
                self.storage.database = database;
            }
        }
        if let Ok(collection) = std::env::var("MONGODB_COLLECTIONNAME") {
            if !collection.is_empty() {
                self.storage.collection = collection;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.storage.uri.starts_with("mongodb://")
            && !self.storage.uri.starts_with("mongodb+srv://")
        {
            return Err(anyhow::anyhow!(
                "storage.uri must be a mongodb:// or mongodb+srv:// connection string"
            ));
        }
        if self.storage.database.is_empty() {
            return Err(anyhow::anyhow!("storage.database cannot be empty"));
        }
        if self.storage.collection.is_empty() {
            return Err(anyhow::anyhow!("storage.collection cannot be empty"));
        }
        if !self.source.endpoint.starts_with("http://")
            && !self.source.endpoint.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "source.endpoint must be an http:// or https:// URL"
            ));
        }
        if self.source.profile.is_empty() {
            return Err(anyhow::anyhow!(
                "source.profile (the seller profile slug) cannot be empty"
            ));
        }
        if let Some(scheduler) = &self.scheduler {
            if scheduler.interval_minutes == 0 {
                return Err(anyhow::anyhow!(
                    "scheduler.interval_minutes must be at least 1"
                ));
            }
        }
        Ok(())
    }
}
