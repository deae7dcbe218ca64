//! Check command - Validate configuration and print what would run

use relay_config::{Config, LogOutput};

use super::serve::LoadedConfig;

/// Print a summary of the loaded configuration to stdout
pub fn run(loaded: &LoadedConfig) {
    let source = match &loaded.path {
        Some(path) => path.display().to_string(),
        None => "(built-in defaults)".to_string(),
    };

    println!("configuration OK: {source}");
    println!();
    for line in summary(&loaded.config) {
        println!("  {line}");
    }
}

fn summary(config: &Config) -> Vec<String> {
    let optional = |d: Option<std::time::Duration>| match d {
        Some(d) => format!("{d:?}"),
        None => "none".to_string(),
    };

    let log_output = match &config.log.output {
        LogOutput::Stdout => "stdout".to_string(),
        LogOutput::Stderr => "stderr".to_string(),
        LogOutput::File(path) => path.clone(),
    };

    vec![
        format!("listen:             {}", config.source.bind_address()),
        format!("max connections:    {}", config.source.max_connections),
        format!(
            "max line length:    {}",
            config
                .source
                .max_line_length
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        ),
        format!("idle timeout:       {}", optional(config.source.idle_timeout())),
        format!("collector:          {}", config.forwarder.target),
        format!("tag:                {}", config.forwarder.tag),
        format!(
            "connect timeout:    {}",
            optional(config.forwarder.connection_timeout())
        ),
        format!("write timeout:      {}", optional(config.forwarder.write_timeout())),
        format!("log level:          {}", config.log.level.as_str()),
        format!("log output:         {log_output}"),
    ]
}
