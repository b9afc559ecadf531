use anyhow::{Context as _, Result};
use clap::Parser;
use log::info;
use pollftpd::config::{load_config, log_config, Config};
use pollftpd::context::Context;
use pollftpd::core_cli::Cli;
use pollftpd::core_fs::LocalFileSystem;
use pollftpd::core_log::clock::SystemClock;
use pollftpd::core_log::logger;
use pollftpd::server::Server;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Load configuration from the TOML file, or run on defaults
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if let Some(root) = args.root {
        config.server.root_dir = root;
    }
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    logger::init(args.verbose, config.server.log_file.as_deref())?;
    info!("Starting pollftpd {}", env!("CARGO_PKG_VERSION"));
    log_config(&config);

    let ip: Ipv4Addr = config
        .server
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.server.listen_address))?;
    let addr = SocketAddrV4::new(ip, config.server.listen_port);

    let fs = Arc::new(LocalFileSystem::new(&config.server.root_dir));
    let context = Arc::new(Context::new(&config, fs, Arc::new(SystemClock)));

    let server = Server::bind(addr, context)?;
    server
        .run(Duration::from_millis(config.server.tick_interval_ms.max(1)))
        .await
}
