use crate::constants::LISTEN_BACKLOG;
use crate::error::FtpError;
use log::{debug, info};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};

/// Creates the non-blocking control listener.
///
/// Failures here are fatal for the server and are reported to the caller,
/// which decides whether to retry.
pub fn bind_listener(addr: SocketAddrV4) -> Result<TcpListener, FtpError> {
    let socket_addr = SocketAddr::V4(addr);
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
        .map_err(FtpError::Socket)?;
    socket.set_reuse_address(true).map_err(FtpError::Socket)?;
    socket
        .bind(&SockAddr::from(addr))
        .map_err(|source| FtpError::Bind {
            addr: socket_addr,
            source,
        })?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| FtpError::Listen {
            addr: socket_addr,
            source,
        })?;
    socket.set_nonblocking(true).map_err(FtpError::Socket)?;

    let listener: TcpListener = socket.into();
    info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts one pending control connection, if any.
///
/// The accepted socket is left blocking: replies are written synchronously
/// and reads only happen after poll reports readiness.
pub fn accept_control(listener: &TcpListener) -> io::Result<Option<(TcpStream, SocketAddr)>> {
    match listener.accept() {
        Ok((stream, addr)) => {
            stream.set_nonblocking(false)?;
            debug!("New connection from {:?}", addr);
            Ok(Some((stream, addr)))
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}
