use anyhow::Result;
use clap::Parser;
use vtrade_onboard::{OnboardError, cli, config::Config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    let cli_args = cli::Cli::parse();

    // The TUI owns the terminal, so only one-shot commands log to stderr
    let mut log_config = logging::LogConfig::new()
        .with_debug_mode(cli_args.debug)
        .with_console(!cli_args.is_interactive());

    // Config errors surface later when the CLI loads it again
    let loaded = match cli_args.config.as_deref() {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if let Ok(config) = loaded {
        log_config = log_config
            .with_level(config.logging.level)
            .with_log_file(config.logging.file);
    }

    let _guard = logging::init_logging(log_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    // Clean up old log files (keep last 7 days)
    if cli_args.debug {
        if let Ok(removed) = logging::cleanup_old_logs(7) {
            if removed > 0 {
                tracing::info!("Cleaned up {} old log file(s)", removed);
            }
        }
    }

    if let Err(e) = cli::run(cli_args).await {
        if let Some(err) = e.downcast_ref::<OnboardError>() {
            tracing::error!(code = %err.code(), recoverable = err.is_recoverable(), "{}", err);
        }
        return Err(e);
    }
    Ok(())
}
