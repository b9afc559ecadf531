use crate::constants::{
    DEFAULT_LISTEN_ADDRESS, DEFAULT_LISTEN_PORT, DEFAULT_RESERVED_PATH, DEFAULT_ROOT_DIR,
    DEFAULT_TICK_INTERVAL_MS, SOCK_BUFFERSIZE,
};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    /// Host directory exposed to clients as `/`.
    pub root_dir: String,
    pub log_file: Option<String>,
    /// Client-visible path that may never be opened for transfer.
    pub reserved_path: String,
    pub socket_buffer_size: usize,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            listen_port: DEFAULT_LISTEN_PORT,
            root_dir: String::from(DEFAULT_ROOT_DIR),
            log_file: None,
            reserved_path: String::from(DEFAULT_RESERVED_PATH),
            socket_buffer_size: SOCK_BUFFERSIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))?;
    Ok(config)
}

pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Root Directory: {}", config.server.root_dir);
    info!(
        "  Log File: {}",
        config.server.log_file.as_deref().unwrap_or("<stderr>")
    );
    info!("  Reserved Path: {}", config.server.reserved_path);
    info!(
        "  Socket Buffer Size: {} KB",
        config.server.socket_buffer_size / 1024
    );
    info!("  Tick Interval: {} ms", config.server.tick_interval_ms);
}
