use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, harvest, status};
use review_sync_config::PathManager;

mod commands;
mod logging;
mod output;
mod runlock;

#[derive(Parser)]
#[command(name = "reviewvault")]
#[command(about = "ReviewVault - Incremental seller review harvester")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest new reviews (one-time run)
    #[command(long_about = "Crawl the configured seller feedback listing and store every review published since the previous run. The first run against an empty collection harvests the full listing.")]
    Harvest {
        /// Ignore the stored checkpoint and crawl the full listing
        #[arg(long, action = ArgAction::SetTrue)]
        force_full: bool,

        /// Crawl and report without writing anything to storage
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Run as a daemon that harvests on a fixed interval
    #[command(long_about = "Run ReviewVault in the foreground and harvest periodically. The daemon performs an initial harvest on startup unless --no-startup-run is specified. Logs go to a daily-rotated file.")]
    Daemon {
        /// Minutes between harvest runs (overrides the configured interval)
        #[arg(long, value_name = "MINUTES")]
        interval: Option<u64>,

        /// Skip the initial harvest on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Show stored review counts and the current checkpoint
    #[command(long_about = "Display how many reviews are stored, the checkpoint date the next incremental run will use, and the most recently stored reviews.")]
    Status {
        /// How many recent reviews to list
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i64).range(1..))]
        limit: i64,
    },
    /// Configure storage and source settings
    #[command(long_about = "Manage configuration for ReviewVault. Use subcommands to view settings, write a default file, or update the storage and source sections. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks credentials in the storage URI)
    Show {
        /// Show the full configuration including masked values
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Configure the storage backend
    #[command(long_about = "Configure the MongoDB deployment reviews are written to. Values not passed as flags are prompted for interactively.")]
    Storage {
        /// MongoDB connection string (if not provided, will prompt)
        #[arg(long)]
        uri: Option<String>,

        /// Database name (if not provided, will prompt)
        #[arg(long)]
        database: Option<String>,

        /// Collection name (if not provided, will prompt)
        #[arg(long)]
        collection: Option<String>,
    },

    /// Configure the review source
    #[command(long_about = "Configure the extractor endpoint and the seller profile whose feedback listing is harvested. Values not passed as flags are prompted for interactively.")]
    Source {
        /// Extractor endpoint base URL (if not provided, will prompt)
        #[arg(long)]
        endpoint: Option<String>,

        /// Seller profile slug to harvest (if not provided, will prompt)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Daemon runs log to a rotated file; everything else logs to stderr
    let log_file = match &cli.command {
        Commands::Daemon { .. } => Some(PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    // Create output handler
    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Harvest {
            force_full,
            dry_run,
        } => harvest::run_harvest(force_full, dry_run, &output).await,
        Commands::Daemon {
            interval,
            no_startup_run,
        } => daemon::run_daemon(interval, no_startup_run, &output).await,
        Commands::Status { limit } => status::run_status(limit, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output).await
        }
    }
}
