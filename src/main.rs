use std::path::PathBuf;

use clap::{Parser, Subcommand};
use openbook::app::{App, Mode};
use openbook::config::Config;
use openbook::domain::Symbol;
use owo_colors::OwoColorize;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "openbook", version, about = "Huobi market-data collector")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, store, and compute features until Ctrl-C.
    Run,
    /// Like `run`, and redraw an order book ladder after each update.
    Watch {
        /// Symbol to display, e.g. btcusdt.
        #[arg(short, long)]
        symbol: String,
        /// Levels per side.
        #[arg(short, long, default_value_t = 10)]
        depth: usize,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let mode = match cli.command {
        Command::CheckConfig => {
            print_summary(&cli.config, &config);
            return;
        }
        Command::Run => Mode::Collect,
        Command::Watch { symbol, depth } => Mode::Watch {
            symbol: Symbol::new(symbol),
            depth,
        },
    };

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install TLS crypto provider");
        std::process::exit(1);
    }

    config.init_logging();
    info!("openbook starting");

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received");
    };

    if let Err(e) = App::run(config, mode, shutdown).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("openbook stopped");
}

fn print_summary(path: &std::path::Path, config: &Config) {
    println!("{} {}", "✓".green(), format!("{} is valid", path.display()).bold());
    println!("  {:<12} {}", "market".dimmed(), config.network.ws_url);
    println!("  {:<12} {}", "feed".dimmed(), config.network.feed_url);
    let symbols: Vec<&str> = config.symbols.iter().map(Symbol::as_str).collect();
    println!("  {:<12} {}", "symbols".dimmed(), symbols.join(", "));
    println!("  {:<12} {}", "levels".dimmed(), config.book.levels);
    println!("  {:<12} {}", "storage".dimmed(), config.storage.dir.display());
    let s3 = if config.storage.s3.enabled {
        format!("s3://{} ({})", config.storage.s3.bucket, config.storage.s3.region)
    } else {
        "disabled".to_string()
    };
    println!("  {:<12} {}", "upload".dimmed(), s3);
    println!("  {:<12} {}", "features".dimmed(), config.features.enabled.join(", "));
}
