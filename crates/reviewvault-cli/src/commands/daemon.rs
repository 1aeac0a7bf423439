use super::config::load_run_config;
use crate::output::Output;
use crate::runlock::RunLock;
use color_eyre::Result;
use review_sync_config::{default_scheduler_config, PathManager, SchedulerConfig};
use review_sync_core::{HarvestReport, Harvester};
use review_sync_sources::FeedbackClient;
use review_sync_store::MongoReviewStore;
use std::time::Duration;
use tracing::{error, info};

/// Fixed-interval harvest loop. The startup run propagates its error so a
/// misconfigured daemon dies loudly; scheduled runs log failures and keep
/// going, since a transient listing or storage outage should not take the
/// daemon down.
pub struct HarvestLoop {
    harvester: Harvester<FeedbackClient, MongoReviewStore>,
    config: SchedulerConfig,
}

impl HarvestLoop {
    pub fn new(
        harvester: Harvester<FeedbackClient, MongoReviewStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self { harvester, config }
    }

    pub async fn start(&self) -> Result<()> {
        if self.config.run_on_startup {
            info!(
                operation = "daemon_startup",
                "Running initial harvest on startup"
            );
            let report = self.run_harvest().await?;
            info!(
                operation = "daemon_startup_complete",
                written = report.written,
                "Initial harvest completed"
            );
        }

        let interval = Duration::from_secs(self.config.interval_minutes * 60);
        info!(
            operation = "daemon_started",
            interval_minutes = self.config.interval_minutes,
            "Daemon started, harvesting on a fixed interval"
        );

        loop {
            tokio::time::sleep(interval).await;

            info!(
                operation = "scheduled_harvest_start",
                "Starting scheduled harvest"
            );
            match self.run_harvest().await {
                Ok(report) => {
                    info!(
                        operation = "scheduled_harvest_complete",
                        written = report.written,
                        collected = report.collected,
                        "Scheduled harvest completed successfully"
                    );
                }
                Err(e) => {
                    error!(
                        operation = "scheduled_harvest_error",
                        error = %e,
                        "Scheduled harvest failed"
                    );
                }
            }
        }
    }

    async fn run_harvest(&self) -> Result<HarvestReport> {
        self.harvester
            .run()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Harvest failed in daemon: {}", e))
    }
}

pub async fn run_daemon(
    interval_override: Option<u64>,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let config = load_run_config()?;

    let scheduler_defaults = default_scheduler_config();
    let scheduler_from_file = config.scheduler.as_ref().unwrap_or(&scheduler_defaults);

    let interval_minutes = interval_override.unwrap_or(scheduler_from_file.interval_minutes);
    if interval_minutes == 0 {
        return Err(color_eyre::eyre::eyre!(
            "Harvest interval must be at least one minute"
        ));
    }
    let run_on_startup = if no_startup_run {
        false
    } else {
        scheduler_from_file.run_on_startup
    };

    let scheduler_config = SchedulerConfig {
        interval_minutes,
        run_on_startup,
    };

    // Held for the daemon's lifetime so manual harvests cannot race it
    let path_manager = PathManager::default();
    let _lock = RunLock::acquire(path_manager.lock_file())?;

    output.info(&format!(
        "Starting daemon, harvesting every {} minutes",
        interval_minutes
    ));
    output.info(&format!(
        "Logs are being written to: {}",
        path_manager.daemon_log_file().display()
    ));

    let store = MongoReviewStore::connect(&config.storage)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to storage: {}", e))?;
    let source = FeedbackClient::new(&config.source)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create review source: {}", e))?;

    let harvester = Harvester::new(source, store);
    HarvestLoop::new(harvester, scheduler_config).start().await
}
