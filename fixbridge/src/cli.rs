/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Command-line arguments.

use crate::config::BridgeConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// fixbridge command line.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "fixbridge", version)]
#[command(about = "Local command bridge to a FIX 4.2 trading venue")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command endpoint: socket path or tcp:<ip>:<port>
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Connector to run: stub or fix
    #[arg(long)]
    pub connector: Option<String>,
}

impl Cli {
    /// Overwrites `config` with the flags that were given.
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(connector) = &self.connector {
            config.connector.clone_from(connector);
        }
    }

    /// Resolves the full configuration: defaults, file, environment, flags.
    ///
    /// # Errors
    /// Fails if the file cannot be loaded or an environment value is invalid.
    pub fn load_config<F>(&self, lookup: F) -> Result<BridgeConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        config.apply_env(lookup)?;
        self.apply(&mut config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "fixbridge",
            "--config",
            "bridge.toml",
            "-e",
            "tcp:127.0.0.1:7001",
            "--connector",
            "fix",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bridge.toml")));
        assert_eq!(cli.endpoint.as_deref(), Some("tcp:127.0.0.1:7001"));
        assert_eq!(cli.connector.as_deref(), Some("fix"));
    }

    #[test]
    fn test_flags_beat_environment_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "connector = \"stub\"\nendpoint = \"/tmp/file.sock\"\n").unwrap();

        let cli = Cli {
            config: Some(path),
            endpoint: None,
            connector: Some("fix".to_string()),
        };
        let config = cli
            .load_config(|name| match name {
                "BRIDGE_ENDPOINT" => Some("/tmp/env.sock".to_string()),
                "BRIDGE_CONNECTOR" => Some("stub".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.connector, "fix");
        assert_eq!(config.endpoint, "/tmp/env.sock");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/bridge.toml")),
            ..Cli::default()
        };
        assert!(cli.load_config(|_| None).is_err());
    }
}
