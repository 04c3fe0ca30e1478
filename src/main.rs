mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use easylogger::args::{ArgParse, LogArgParser};
use easylogger::bridge::RegistryLayer;
use easylogger::config::LogConfig;
use easylogger::{Log, Logger};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LogConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => LogConfig::default(),
    };
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if cli.to_file {
        config.log_to_file = true;
    }

    // Internal diagnostics go to stderr; events from other crates also reach the logger
    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(RegistryLayer::new().with_fallback(Logger::get(&config.name)))
        .with(LevelFilter::from_level(level))
        .init();

    let mut options = config
        .to_options()
        .context("Invalid rotation settings")?
        .debugging(cli.debug);
    if options.level.is_none() && !cli.debug {
        let level = LogArgParser::from_args(&cli.rest, false)
            .context("Failed to read the log level argument")?;
        options = options.level(level.level_str());
    }

    let log = Log::new(options).context("Failed to create logger")?;
    log.install_panic_hook();
    if let Some(path) = log.log_path() {
        log.debug(format!("Writing log files to {}", path.display()));
    }

    if !config.args.is_empty() {
        let mut parser =
            ArgParse::new(&config.args, false).context("Invalid argument specification")?;
        let parsed = parser
            .parse_from(&cli.rest)
            .context("Failed to parse arguments")?;
        log.info(format!(
            "Parsed arguments: {}",
            serde_json::to_string(parsed.namespace())?
        ));
        if !parsed.remaining().is_empty() {
            log.debug(format!("Unrecognised arguments: {:?}", parsed.remaining()));
        }
    }

    let worker = log.child("worker").context("Failed to create worker")?;
    worker.info("Child logger ready.");
    if let Err(e) = "forty-two".parse::<u32>() {
        worker.error_from(&e, "Sample error report");
    }
    worker.close();

    log.close();
    Ok(())
}
