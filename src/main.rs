use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use timber::config::Config;
use timber::{call_site, LogLevel, Timber};

const USAGE: &str = "usage: timber [error|warn|info|debug|verbose] <message...>";

#[tokio::main]
async fn main() -> Result<()> {
    // Timber's own diagnostics go to stderr
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "timber=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let level = match LogLevel::parse(&args[0]) {
        LogLevel::None => LogLevel::Info,
        level => {
            args.remove(0);
            level
        }
    };
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let config = Config::load()?;
    let (timber, device) =
        Timber::from_config(&config).context("Failed to set up log sinks")?;

    tracing::debug!(
        "Logging through {} sinks at threshold {}",
        timber.sink_count(),
        timber.threshold()
    );

    timber.log_at(level, args.join(" "), call_site!());

    // Give the device snapshot a chance to land before exiting
    if let Some(device) = device {
        if let Some(handle) = device.on_suspend() {
            let _ = handle.join();
        }
    }

    // Let any in-flight HTTP delivery finish
    if config.http.is_some() {
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }

    Ok(())
}
