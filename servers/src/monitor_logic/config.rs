use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use lib_monitor::ServiceConfig;

const DEFAULT_CONFIG_FILE: &str = "server_monitor.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Game-server telemetry bridge", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "MONITOR_BIND_IP", help = "IP address to listen on for query connections.")]
    pub bind_ip: Option<String>,

    #[clap(long, env = "MONITOR_PORT", help = "Port to listen on for query connections.")]
    pub port: Option<u16>,

    #[clap(long, env = "MONITOR_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "MONITOR_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "MONITOR_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "MONITOR_SWEEP_INTERVAL_MS", help = "Interval in milliseconds between statistics sweeps.")]
    pub sweep_interval_ms: Option<u64>,

    #[clap(long, env = "MONITOR_RETRY_INTERVAL_MS", help = "Delay in milliseconds between query-server bind attempts.")]
    pub retry_interval_ms: Option<u64>,

    #[clap(long, env = "MONITOR_WORLD_DIR", help = "World directory holding the per-player statistics artifacts.")]
    pub world_dir: Option<PathBuf>,

    #[clap(long, env = "MONITOR_WHITELIST_DIR", help = "Directory holding the whitelist file.")]
    pub whitelist_dir: Option<PathBuf>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            bind_ip: other.bind_ip.or(self.bind_ip),
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            sweep_interval_ms: other.sweep_interval_ms.or(self.sweep_interval_ms),
            retry_interval_ms: other.retry_interval_ms.or(self.retry_interval_ms),
            world_dir: other.world_dir.or(self.world_dir),
            whitelist_dir: other.whitelist_dir.or(self.whitelist_dir),
        }
    }

    /// The core service's view of this configuration.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let ip: IpAddr = self
            .bind_ip
            .as_deref()
            .unwrap_or("127.0.0.1")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind IP: {}", e))?;
        Ok(ServiceConfig {
            bind_addr: SocketAddr::new(ip, self.port.unwrap_or(8765)),
            sweep_interval: Duration::from_millis(self.sweep_interval_ms.unwrap_or(1000)),
            retry_interval: Duration::from_millis(self.retry_interval_ms.unwrap_or(1000)),
            whitelist_dir: self.whitelist_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn world_dir(&self) -> PathBuf {
        self.world_dir.clone().unwrap_or_else(|| PathBuf::from("./world"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| "info".to_string())
    }
}

pub fn load_config() -> Config {
    // 1. Load defaults
    let default_config = Config {
        bind_ip: Some("127.0.0.1".to_string()),
        port: Some(8765),
        log_dir: Some(PathBuf::from("./logs")),
        log_level: Some("info".to_string()),
        sweep_interval_ms: Some(1000),
        retry_interval_ms: Some(1000),
        world_dir: Some(PathBuf::from("./world")),
        whitelist_dir: Some(PathBuf::from(".")),
        ..Default::default()
    };

    // 2. Load from the config file if present. CLI/env may override its path.
    let cli_args = Config::parse();
    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = default_config;

    if config_file_path.exists() {
        if let Ok(config_str) = fs::read_to_string(&config_file_path) {
            if let Ok(file_config) = serde_json::from_str::<Config>(&config_str) {
                current_config = current_config.merge(file_config);
            } else {
                log::warn!(
                    "Failed to parse config file: {}. Falling back to other sources.",
                    config_file_path.display()
                );
            }
        } else {
            log::warn!(
                "Failed to read config file: {}. Falling back to other sources.",
                config_file_path.display()
            );
        }
    }

    // 3. Environment variables and CLI arguments win over the file.
    current_config.merge(cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_override_values() {
        let base = Config {
            port: Some(8765),
            log_level: Some("info".to_string()),
            ..Default::default()
        };
        let overlay = Config {
            port: Some(9001),
            world_dir: Some(PathBuf::from("/srv/world")),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.port, Some(9001));
        assert_eq!(merged.world_dir, Some(PathBuf::from("/srv/world")));
        // Untouched fields fall back to the base.
        assert_eq!(merged.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_service_config_defaults() {
        let config = Config::default();
        let service = config.service_config().unwrap();
        assert_eq!(service.bind_addr, "127.0.0.1:8765".parse().unwrap());
        assert_eq!(service.sweep_interval, Duration::from_millis(1000));
        assert_eq!(service.retry_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_service_config_rejects_bad_ip() {
        let config = Config {
            bind_ip: Some("not-an-ip".to_string()),
            ..Default::default()
        };
        assert!(config.service_config().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let json = r#"{"port": 9002, "sweepIntervalMs": 250, "whitelistDir": "/srv/mc"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.port, Some(9002));
        assert_eq!(config.sweep_interval_ms, Some(250));
        assert_eq!(config.whitelist_dir, Some(PathBuf::from("/srv/mc")));
    }
}
