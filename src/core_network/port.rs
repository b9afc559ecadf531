use crate::core_ftpcommand::reply::Reply;
use crate::core_network::address::FtpAddress;
use crate::core_network::socket::set_options;
use crate::session::{CloseMask, Session, SessionFlags, SessionState};
use log::{debug, warn};
use socket2::{Domain, Protocol, SockAddr, SockRef, Socket, Type};
use std::io;
use std::net::{SocketAddrV4, TcpStream};

/// Handles the PORT FTP command.
///
/// Parses the client's `h1,h2,h3,h4,p1,p2` address and remembers it. No
/// connection is made here; the session dials out when a transfer command
/// arms DATA_CONNECT.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The address in RFC 959 notation.
pub fn handle_port_command(session: &mut Session, arg: &str) {
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.flags.remove(SessionFlags::PASV | SessionFlags::PORT);

    match arg.parse::<FtpAddress>() {
        Ok(FtpAddress(addr)) => {
            debug!("PORT target set to {}", addr);
            session.peer_addr = Some(addr);
            session.flags.insert(SessionFlags::PORT);
            session.send_response(Reply::new(200, "OK"));
        }
        Err(e) => {
            warn!("Rejected PORT argument {:?}: {}", arg, e);
            session.send_response(Reply::new(501, "Invalid argument"));
        }
    }
}

/// Starts a non-blocking connection to the PORT address.
///
/// Returns the stream and whether the connection completed immediately. An
/// in-progress connection finishes once the socket reports writable.
pub fn connect_data(peer: SocketAddrV4, buffer_size: usize) -> io::Result<(TcpStream, bool)> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    set_options(SockRef::from(&socket), buffer_size)?;
    socket.set_nonblocking(true)?;

    let connected = match socket.connect(&SockAddr::from(peer)) {
        Ok(()) => true,
        Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => false,
        Err(e) => return Err(e),
    };

    Ok((socket.into(), connected))
}
