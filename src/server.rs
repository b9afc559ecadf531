use crate::constants::GREETING;
use crate::context::Context;
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandTable};
use crate::core_ftpcommand::reply::Reply;
use crate::core_network::network;
use crate::core_transfer::LoopStatus;
use crate::error::FtpError;
use crate::session::Session;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener};
use std::sync::Arc;
use std::time::Duration;

/// Owns the control listener and every live session.
///
/// Sessions are kept in id order and are only added or removed inside
/// [`Server::tick`], never while another session is being polled.
pub struct Server {
    listener: Option<TcpListener>,
    bind_addr: SocketAddrV4,
    sessions: BTreeMap<u64, Session>,
    next_id: u64,
    context: Arc<Context>,
    commands: CommandTable,
}

impl Server {
    /// Binds the control listener.
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to listen on. Port 0 picks an ephemeral port.
    /// * `context` - Filesystem, clock and limits shared with every session.
    ///
    /// # Returns
    ///
    /// The server, or `FtpError::Bind`/`FtpError::Listen` if the socket cannot be set up.
    pub fn bind(addr: SocketAddrV4, context: Arc<Context>) -> Result<Self, FtpError> {
        let listener = network::bind_listener(addr)?;
        let bind_addr = match listener.local_addr()? {
            SocketAddr::V4(local) => local,
            SocketAddr::V6(_) => addr,
        };

        Ok(Self {
            listener: Some(listener),
            bind_addr,
            sessions: BTreeMap::new(),
            next_id: 0,
            context,
            commands: initialize_command_handlers(),
        })
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.bind_addr
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// One accept pass and one poll pass over every session.
    pub fn tick(&mut self) -> LoopStatus {
        let status = self.accept_pending();

        for session in self.sessions.values_mut() {
            session.poll(&self.commands);
        }

        self.sessions.retain(|id, session| {
            let connected = session.is_connected();
            if !connected {
                info!("[session {}] removed", id);
            }
            connected
        });

        status
    }

    fn accept_pending(&mut self) -> LoopStatus {
        if self.listener.is_none() {
            match network::bind_listener(self.bind_addr) {
                Ok(listener) => self.listener = Some(listener),
                Err(e) => {
                    error!("Failed to rebuild listener: {}", e);
                    return LoopStatus::Restart;
                }
            }
        }

        loop {
            let accepted = match self.listener.as_ref() {
                Some(listener) => network::accept_control(listener),
                None => return LoopStatus::Restart,
            };

            match accepted {
                Ok(Some((stream, peer))) => {
                    let id = self.next_id;
                    self.next_id += 1;
                    match Session::new(id, stream, Arc::clone(&self.context)) {
                        Ok(mut session) => {
                            info!("[session {}] accepted connection from {}", id, peer);
                            session.send_response(Reply::new(220, GREETING));
                            self.sessions.insert(id, session);
                        }
                        Err(e) => error!("Failed to set up session for {}: {}", peer, e),
                    }
                }
                Ok(None) => return LoopStatus::Continue,
                Err(e) if e.raw_os_error() == Some(libc::ENETDOWN) => {
                    warn!("Network is down, dropping the listener");
                    self.listener = None;
                    return LoopStatus::Restart;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    error!("{}", FtpError::Accept(e));
                    return LoopStatus::Continue;
                }
            }
        }
    }

    /// Ticks the server every `interval` until Ctrl-C.
    pub async fn run(mut self, interval: Duration) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.tick() == LoopStatus::Restart {
                        debug!("Listener will be rebuilt on the next tick");
                    }
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Shutting down, closing {} sessions", self.sessions.len());
                    break;
                }
            }
        }

        for session in self.sessions.values_mut() {
            session.close_control();
        }
        Ok(())
    }
}
