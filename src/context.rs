use crate::config::Config;
use crate::core_fs::FileSystem;
use crate::core_log::clock::Clock;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collaborators shared by the server and every session.
///
/// Built once at startup and handed down explicitly; nothing in the engine
/// reaches for global time or storage state.
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub clock: Arc<dyn Clock>,
    pub start_time: DateTime<Utc>,
    /// Client-visible path refused for transfers, usually the server log.
    pub reserved_path: Option<String>,
    pub socket_buffer_size: usize,
}

impl Context {
    pub fn new(config: &Config, fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>) -> Self {
        let reserved_path = Some(config.server.reserved_path.clone()).filter(|p| !p.is_empty());
        Self {
            start_time: clock.now(),
            fs,
            clock,
            reserved_path,
            socket_buffer_size: config.server.socket_buffer_size,
        }
    }

    pub fn is_reserved(&self, path: &str) -> bool {
        self.reserved_path.as_deref() == Some(path)
    }
}
