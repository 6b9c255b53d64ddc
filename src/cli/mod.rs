//! CLI Module
//!
//! Command-line interface for the VTrade onboarding client using Clap v4.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::OnboardError;
use crate::onboarding::{PersistedSession, SessionStore};

/// VTrade - Digital asset issuance onboarding in the terminal
#[derive(Parser, Debug)]
#[command(name = "vtrade")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (writes trace logs to ~/.vtrade/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether the chosen command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Start { .. }))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive sign-in and issuance wizard (default)
    Start {
        /// Go straight to the wizard without signing in
        #[arg(long)]
        skip_auth: bool,
    },

    /// Show the saved wizard progress
    Status,

    /// Forget the saved session (sign-in and wizard progress)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    Config,

    /// Log management operations
    Logs {
        #[command(subcommand)]
        operation: LogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show log file location and status
    Status,
    /// View recent log entries
    View {
        /// Number of lines to show (default: 50)
        #[arg(short, long, default_value = "50")]
        lines: usize,
    },
    /// Clean up old log files
    Clean {
        /// Maximum age in days (default: 7)
        #[arg(short = 'a', long, default_value = "7")]
        days: u64,
    },
    /// Open log directory in file manager
    Open,
}

/// Main CLI entry point
pub async fn run(cli: Cli) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        None => cmd_start(config, false).await,
        Some(Commands::Start { skip_auth }) => cmd_start(config, skip_auth).await,
        Some(Commands::Status) => cmd_status(&config),
        Some(Commands::Reset { force }) => cmd_reset(&config, force),
        Some(Commands::Init { force }) => cmd_init(force),
        Some(Commands::Config) => cmd_config(&config),
        Some(Commands::Logs { operation }) => cmd_logs(&config, operation),
    }
}

fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    config
        .validate()
        .map_err(|e| OnboardError::Config(format!("{:#}", e)))?;

    Ok(config)
}

async fn cmd_start(config: Config, skip_auth: bool) -> Result<()> {
    use crate::tui;

    let mut app = tui::App::new(config).context("Failed to start")?;
    if skip_auth {
        app.skip_auth();
    }

    tui::run(app).await.context("TUI error")?;

    println!("\nProgress saved. Run 'vtrade' to pick up where you left off.");
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    let store = SessionStore::new(config.session.path.clone());
    let Some(session) = store.try_load().map_err(OnboardError::from)? else {
        println!("No saved session at: {}", store.path().display());
        println!("\nRun 'vtrade' to start.");
        return Ok(());
    };

    print_status(&session);
    Ok(())
}

fn print_status(session: &PersistedSession) {
    let auth = &session.auth;
    let wizard = &session.onboarding;

    println!("VTrade Onboarding Status\n");
    println!("Saved: {}", session.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));

    let who = auth
        .user
        .as_ref()
        .and_then(|u| u.email.clone().or_else(|| u.phone.clone()));
    match (auth.is_authenticated, who) {
        (true, Some(who)) => println!("Signed in: {}", who),
        (true, None) => println!("Signed in"),
        (false, _) => println!("Signed in: no"),
    }

    match (&wizard.wallet.selected_provider, &wizard.wallet.wallet_address) {
        (Some(provider), Some(address)) => println!(
            "Wallet: {} {}",
            provider,
            crate::utils::short_address(address)
        ),
        _ => println!("Wallet: not connected"),
    }

    let current = wizard.navigation.current();
    println!("\nSteps:");
    for n in 1..=wizard.navigation.len() {
        if let Some(step) = wizard.navigation.step(n) {
            let marker = if step.completed {
                "✓"
            } else if step.kind == current {
                "●"
            } else {
                "○"
            };
            println!("  {} {}. {}", marker, n, step.title);
        }
    }
}

fn cmd_reset(config: &Config, force: bool) -> Result<()> {
    let store = SessionStore::new(config.session.path.clone());

    if !force {
        use std::io::Write;
        print!(
            "This will sign you out and discard wizard progress at {}. Continue? [y/N] ",
            store.path().display()
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.clear()? {
        println!("Session cleared.");
    } else {
        println!("No saved session to clear.");
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    println!("VTrade Configuration Initialization\n");

    let config_path = Config::system_config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("Configuration initialized at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Point api.base_url at your VTrade backend");
    println!("   2. Set wallet.rpc_url to use a JSON-RPC wallet instead of the simulator");
    println!("   3. Run 'vtrade' to start");

    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("VTrade Configuration\n");
    println!("System config: {}", Config::system_config_path().display());
    println!("Local config:  {}\n", Config::local_config_path().display());

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

fn log_dir(config: &Config) -> std::path::PathBuf {
    config
        .logging
        .file
        .as_ref()
        .and_then(|f| f.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(crate::logging::default_log_dir)
}

fn cmd_logs(config: &Config, operation: LogCommands) -> Result<()> {
    use crate::logging;
    use std::io::{BufRead, BufReader};

    let log_dir = log_dir(config);

    match operation {
        LogCommands::Status => {
            println!("VTrade Logging Status\n");
            println!("Log directory: {}", log_dir.display());

            let logs = logging::list_logs(&log_dir)?;
            if logs.is_empty() {
                println!("Status: no logs found");
                println!("\nRun with -d to write debug logs:");
                println!("   vtrade -d");
                return Ok(());
            }

            let total_size: u64 = logs
                .iter()
                .filter_map(|p| std::fs::metadata(p).ok())
                .map(|m| m.len())
                .sum();
            println!("Log files: {}", logs.len());
            println!("Total size: {:.2} MB", total_size as f64 / (1024.0 * 1024.0));
            println!("Latest log: {}", logs[0].display());
            Ok(())
        }

        LogCommands::View { lines } => {
            let logs = logging::list_logs(&log_dir)?;
            let Some(log_path) = logs.first() else {
                println!("No log files found.\n");
                println!("Run with -d to write debug logs:");
                println!("   vtrade -d");
                return Ok(());
            };

            println!("Viewing last {} lines of: {}\n", lines, log_path.display());

            let file = std::fs::File::open(log_path)?;
            let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
            let start = all_lines.len().saturating_sub(lines);

            for line in &all_lines[start..] {
                println!("{}", line);
            }
            if all_lines.is_empty() {
                println!("(empty log file)");
            }
            Ok(())
        }

        LogCommands::Clean { days } => {
            println!("Cleaning up log files older than {} days...\n", days);

            match logging::cleanup_old_logs(days) {
                Ok(0) => println!("No old log files to remove"),
                Ok(removed) => println!("Removed {} old log file(s)", removed),
                Err(e) => println!("Error cleaning logs: {}", e),
            }
            Ok(())
        }

        LogCommands::Open => {
            if !log_dir.exists() {
                println!("Log directory does not exist: {}", log_dir.display());
                return Ok(());
            }

            println!("Opening log directory: {}", log_dir.display());

            #[cfg(target_os = "macos")]
            let opener = "open";
            #[cfg(target_os = "windows")]
            let opener = "explorer";
            #[cfg(not(any(target_os = "macos", target_os = "windows")))]
            let opener = "xdg-open";

            std::process::Command::new(opener)
                .arg(&log_dir)
                .spawn()
                .context("Failed to open directory")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::onboarding::OnboardingState;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_interactive() {
        let cli = Cli::parse_from(["vtrade"]);
        assert!(cli.is_interactive());

        let cli = Cli::parse_from(["vtrade", "start", "--skip-auth"]);
        assert!(matches!(cli.command, Some(Commands::Start { skip_auth: true })));

        let cli = Cli::parse_from(["vtrade", "logs", "clean", "-a", "3"]);
        assert!(!cli.is_interactive());
        assert!(matches!(
            cli.command,
            Some(Commands::Logs {
                operation: LogCommands::Clean { days: 3 }
            })
        ));
    }

    #[test]
    fn test_forced_reset_clears_session() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.path = dir.path().join("session.json");

        let store = SessionStore::new(config.session.path.clone());
        store
            .save(&PersistedSession::new(
                AuthState::default(),
                OnboardingState::default(),
            ))
            .unwrap();
        assert!(config.session.path.exists());

        cmd_reset(&config, true).unwrap();
        assert!(!config.session.path.exists());
    }

    #[test]
    fn test_status_without_session() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.path = dir.path().join("missing.json");
        assert!(cmd_status(&config).is_ok());
    }
}
