use clap::Parser;
use egx_scan::cli::{Cli, Commands};
use egx_scan::config::Config;
use egx_scan::session::SessionCalendar;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    egx_scan::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Scan(args) => {
            tracing::info!(trigger = ?args.trigger, "Starting scan");
            args.execute(config).await?;
        }
        Commands::Status => {
            let calendar = SessionCalendar::new(&config.session, &config.exchange.timezone)?;
            let now = chrono::Utc::now();
            let status = calendar.status(now);
            println!("egx-scan status");
            println!(
                "  Exchange: {} ({})",
                config.exchange.name, config.exchange.timezone
            );
            println!(
                "  Local time: {}",
                calendar.local_now(now).format("%Y-%m-%d %H:%M")
            );
            println!("  Market open: {} ({:?})", status.open, status.reason);
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Exchange: {} ({}), screener {}",
                config.exchange.name, config.exchange.timezone, config.exchange.screener
            );
            println!(
                "  Session: {}-{}, holidays {:?}",
                config.session.open, config.session.close, config.session.holidays
            );
            println!(
                "  Universe: up to {} rows, {} exclusion markers",
                config.universe.max_rows,
                config.universe.exclude_markers.len()
            );
            println!(
                "  History: {}m bars, {} day lookback, min {} bars",
                config.history.resolution_minutes, config.history.lookback_days, config.history.min_bars
            );
            println!(
                "  Channel: period={}, trend_filter={}",
                config.channel.period, config.channel.trend_filter
            );
            println!(
                "  Scan: strategy={:?}, depth={}, concurrency={}",
                config.scan.strategy, config.scan.depth, config.scan.max_concurrency
            );
            println!(
                "  Report: cap={}, decimals={}",
                config.report.cap, config.report.price_decimals
            );
            println!(
                "  Telegram: {} destination(s), token {}",
                config.telegram.destinations.len(),
                if config.telegram.bot_token.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
        }
    }

    Ok(())
}
