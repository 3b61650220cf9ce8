//! NitroShare daemon and settings command line.

use std::{path::PathBuf, process, time::Duration};

use clap::{Parser, Subcommand};
use tracing::{Level, info, span};

use nitroshare::{
    config::ConfigPaths,
    config_store::{DEFAULT_DEBOUNCE_WINDOW, StoreOptions},
    daemon::{Daemon, open_store, read_value},
    tracing_config,
};

#[derive(Parser)]
#[command(name = "nitroshare")]
#[command(about = "Cross-platform file transfer application")]
struct Cli {
    /// Directory holding config.json (defaults to the XDG config directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Quiet period in milliseconds before changes are written to disk
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon until SIGINT or SIGTERM
    Run,
    /// Read or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a value; with --default, store the default first if the key has none
    Get {
        key: String,
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Store a value
    Set { key: String, value: String },
    /// Print every stored value
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Fatal error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => ConfigPaths::config_dir()?,
    };

    let debounce_window = cli
        .debounce_ms
        .map_or(DEFAULT_DEBOUNCE_WINDOW, Duration::from_millis);
    let options = StoreOptions::default().with_debounce_window(debounce_window);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing_config::init_with_file()?;
            let _span = span!(Level::INFO, "nitroshare_daemon").entered();
            info!("Starting NitroShare");

            let daemon = Daemon::start(&config_dir, options)?;
            daemon.run_until_signal().await?;

            info!("NitroShare stopped");
        }
        Commands::Config { action } => {
            tracing_config::init()?;
            let store = open_store(&config_dir, options)?;

            match action {
                ConfigAction::Get { key, default } => {
                    if let Some(value) = read_value(&store, &key, default.as_deref()) {
                        println!("{value}");
                    }
                }
                ConfigAction::Set { key, value } => {
                    store.set(&key, &value);
                }
                ConfigAction::List => {
                    for (key, value) in store.snapshot() {
                        println!("{key} = {value}");
                    }
                }
            }

            store.close().await;
        }
    }

    Ok(())
}
