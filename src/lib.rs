//! A poll-driven FTP server.
//!
//! The [`server::Server`] accepts control connections and ticks every
//! [`session::Session`]; each session multiplexes its control socket with
//! at most one passive or data socket and never blocks waiting for either.

pub mod config;
pub mod constants;
pub mod context;
pub mod core_cli;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod core_transfer;
pub mod error;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
