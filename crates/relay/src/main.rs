//! Relay - Syslog over TCP to a JSON-line collector
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (listen on 0.0.0.0:5140)
//! relay
//! relay --config relay.toml
//!
//! # Validate a config file and exit
//! relay --config relay.toml --check
//! ```

mod cmd;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use relay_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Relay - Syslog over TCP to a JSON-line collector
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (error if specified but not found)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate configuration, print a summary and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = cmd::serve::load_config(cli.config.as_deref())?;

    if cli.check {
        cmd::check::run(&loaded);
        return Ok(());
    }

    let log_level = resolve_log_level(cli.log_level.as_deref(), &loaded.config.log);
    init_logging(&log_level, &loaded.config.log)?;

    cmd::serve::run(loaded).await
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, log: &LogConfig) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (writer, ansi) = log_writer(&log.output)?;

    let registry = tracing_subscriber::registry().with(filter);

    match log.format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
    }

    Ok(())
}

/// Writer for the configured destination, and whether it takes ANSI colors
fn log_writer(output: &LogOutput) -> Result<(BoxMakeWriter, bool)> {
    match output.file_path() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
        None if *output == LogOutput::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), true)),
        None => Ok((BoxMakeWriter::new(std::io::stdout), true)),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use relay_config::LogLevel;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["relay", "-c", "relay.toml", "-l", "debug", "--check"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("relay.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.check);
    }

    #[test]
    fn test_log_level_precedence() {
        let log = LogConfig {
            level: LogLevel::Warn,
            ..Default::default()
        };

        assert_eq!(resolve_log_level(Some("trace"), &log), "trace");
        assert_eq!(resolve_log_level(None, &log), "warn");
        assert_eq!(resolve_log_level(None, &LogConfig::default()), "info");
    }

    #[test]
    fn test_file_output_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.log");
        let output = LogOutput::File(path.display().to_string());

        let (_writer, ansi) = log_writer(&output).unwrap();
        assert!(path.exists());
        assert!(!ansi);
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let output = LogOutput::File("/definitely/not/here/relay.log".into());
        assert!(log_writer(&output).is_err());
    }

    #[test]
    fn test_console_outputs_use_ansi() {
        assert!(log_writer(&LogOutput::Stdout).unwrap().1);
        assert!(log_writer(&LogOutput::Stderr).unwrap().1);
    }
}
