//! Serve command - Run the relay
//!
//! Listens for syslog over TCP and forwards each line to the collector
//! until SIGINT or SIGTERM.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use relay::Relay;
use relay_config::Config;
use tokio::signal;
use tokio::time::{Duration, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_PATH: &str = "relay.toml";

/// Configuration plus the file it came from, if any
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

/// Load configuration
///
/// An explicit path must exist. Without one, `relay.toml` is used when
/// present, otherwise the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "config file not found: {}",
                path.display()
            ));
        }
        let config = Config::from_file(path).context("failed to load configuration")?;
        return Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
        });
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = Config::from_file(&default_path).context("failed to load configuration")?;
        return Ok(LoadedConfig {
            config,
            path: Some(default_path),
        });
    }

    Ok(LoadedConfig {
        config: Config::default(),
        path: None,
    })
}

/// Run the serve command
pub async fn run(loaded: LoadedConfig) -> Result<()> {
    let config_path = loaded
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(default)".to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path,
        "relay starting"
    );

    if let Err(e) = run_relay(&loaded.config).await {
        error!(error = %e, "relay error");
        return Err(e);
    }

    info!("relay shutdown complete");
    Ok(())
}

/// Main run loop
async fn run_relay(config: &Config) -> Result<()> {
    let relay = Relay::from_config(config);

    // Bind failure is fatal
    let listener = relay
        .source
        .bind()
        .await
        .context("failed to start syslog listener")?;

    let cancel = CancellationToken::new();
    let source = std::sync::Arc::clone(&relay.source);
    let source_cancel = cancel.clone();
    let mut source_task =
        tokio::spawn(async move { source.run_with_listener(listener, source_cancel).await });

    let stopped_early = tokio::select! {
        _ = wait_for_shutdown() => None,
        result = &mut source_task => Some(result),
    };

    cancel.cancel();

    match stopped_early {
        None => {
            info!("shutdown signal received, stopping relay...");
            let shutdown_timeout = Duration::from_secs(config.global.shutdown_timeout_secs);

            match timeout(shutdown_timeout, source_task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => warn!(error = %e, "syslog source failed during shutdown"),
                Ok(Err(e)) => warn!(error = %e, "source task panicked during shutdown"),
                Err(_) => warn!("source task did not finish within timeout, continuing shutdown"),
            }
        }
        Some(result) => {
            result
                .context("source task panicked")?
                .context("syslog source failed")?;
            warn!("syslog source stopped without a shutdown signal");
        }
    }

    relay.log_metrics_summary();
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here/relay.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nport = 1514\n\n[forwarder]\ntag = \"edge\"").unwrap();

        let loaded = load_config(Some(file.path())).unwrap();
        assert_eq!(loaded.config.source.port, 1514);
        assert_eq!(loaded.config.forwarder.tag, "edge");
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_invalid_explicit_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmax_connections = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("max_connections"));
    }
}
