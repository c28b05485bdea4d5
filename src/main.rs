//! Keyclack - mechanical keyboard sound feedback for Linux
//!
//! Run with `keyclack` or `keyclack daemon` to start the daemon.
//! Use `keyclack config` to print the active configuration.

use clap::{Parser, Subcommand};
use keyclack::{config, daemon};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyclack")]
#[command(author, version, about = "Mechanical keyboard sound feedback for Linux")]
#[command(long_about = "
Keyclack plays a mechanical keyboard sound for every key you press,
with distinct cues for modifiers, navigation keys, punctuation and
shortcuts like Ctrl+C, plus a sustained hum while a key is held.

SETUP:
  1. Add yourself to the input group: sudo usermod -aG input $USER
  2. Log out and back in
  3. Run: keyclack

USAGE:
  Toggle feedback at any time with Ctrl+Shift+F12, or send the daemon
  SIGUSR1 (resume) / SIGUSR2 (pause).
")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Override sound theme ("default" or a theme directory)
    #[arg(long, value_name = "THEME")]
    theme: Option<String>,

    /// Override volume (0.0 to 1.0)
    #[arg(long, value_name = "VOLUME")]
    volume: Option<f32>,

    /// Start with feedback paused
    #[arg(long)]
    paused: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as daemon (default if no command specified)
    Daemon,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("keyclack={},warn", log_level))),
        )
        .with_target(false)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(theme) = cli.theme {
        config.sound.theme = theme;
    }
    if let Some(volume) = cli.volume {
        anyhow::ensure!(
            (0.0..=1.0).contains(&volume),
            "--volume must be between 0.0 and 1.0"
        );
        config.sound.volume = volume;
    }
    if cli.paused {
        config.start_paused = true;
    }

    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::Daemon => {
            let mut daemon = daemon::Daemon::new(config);
            daemon.run().await?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

/// Print the active configuration as TOML
fn show_config(config: &config::Config) -> anyhow::Result<()> {
    if let Some(path) = config::Config::default_path() {
        if path.exists() {
            println!("# Config file: {}", path.display());
        } else {
            println!("# Config file not found at {} (using defaults)", path.display());
            println!("# Default config:\n");
            println!("{}", config::DEFAULT_CONFIG);
            return Ok(());
        }
    }
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
