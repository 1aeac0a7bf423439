use super::config::load_run_config;
use crate::output::Output;
use crate::runlock::RunLock;
use color_eyre::Result;
use review_sync_config::PathManager;
use review_sync_core::{HarvestOptions, Harvester};
use review_sync_sources::FeedbackClient;
use review_sync_store::MongoReviewStore;
use serde_json::json;
use std::io::IsTerminal;

pub async fn run_harvest(force_full: bool, dry_run: bool, output: &Output) -> Result<()> {
    tracing::debug!("Harvest command started");

    let config = load_run_config()?;

    let path_manager = PathManager::default();
    let _lock = RunLock::acquire(path_manager.lock_file())?;

    let spinner = if is_interactive()
        && output.format() == crate::output::OutputFormat::Human
        && !output.is_quiet()
    {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap(),
        );
        spinner.set_message("Connecting to storage...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(spinner)
    } else {
        None
    };

    let store = match MongoReviewStore::connect(&config.storage).await {
        Ok(store) => store,
        Err(e) => {
            if let Some(s) = &spinner {
                s.finish_and_clear();
            }
            return Err(color_eyre::eyre::eyre!("Failed to connect to storage: {}", e));
        }
    };

    let source = FeedbackClient::new(&config.source)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create review source: {}", e))?;

    if let Some(s) = &spinner {
        s.set_message(format!("Harvesting reviews for {}...", config.source.profile));
    }

    let harvester =
        Harvester::new(source, store).with_options(HarvestOptions { force_full, dry_run });

    let result = harvester.run().await;
    if let Some(s) = &spinner {
        s.finish_and_clear();
    }
    let report = result.map_err(|e| color_eyre::eyre::eyre!("Harvest failed: {}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            if report.dry_run {
                output.info(&format!(
                    "Dry run: {} new reviews found, nothing written",
                    report.collected
                ));
            } else {
                output.success(&format!(
                    "Harvest completed: {} new reviews stored in {:.1}s",
                    report.written, report.duration_secs
                ));
            }
            match report.checkpoint {
                Some(date) => output.info(&format!(
                    "  Checkpoint: {} | Pages fetched: {}/{}",
                    date, report.pages_fetched, report.total_pages
                )),
                None => output.info(&format!(
                    "  Full crawl | Pages fetched: {}/{}",
                    report.pages_fetched, report.total_pages
                )),
            }
            if !report.dry_run && report.collected > report.written {
                output.info(&format!(
                    "  Already present: {}",
                    report.collected - report.written
                ));
            }
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let json_result = json!({
                "success": true,
                "report": report,
            });
            output.json(&json_result);
        }
    }

    Ok(())
}

fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
