use crate::constants::PASV_BACKLOG;
use crate::core_ftpcommand::reply::Reply;
use crate::core_network::address::FtpAddress;
use crate::core_network::socket::set_options;
use crate::error::FtpError;
use crate::session::{CloseMask, Session, SessionFlags, SessionState};
use log::{debug, error, info};
use socket2::{Domain, Protocol, SockAddr, SockRef, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};

/// Handles the PASV FTP command.
///
/// Drops any previous PASV/PORT arrangement, opens a fresh listener on an
/// ephemeral port of the control connection's local address and announces it
/// as `227 h1,h2,h3,h4,p1,p2`. The listener is accepted lazily once a
/// transfer command moves the session to DATA_CONNECT.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `_arg` - Ignored.
pub fn handle_pasv_command(session: &mut Session, _arg: &str) {
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.flags.remove(SessionFlags::PASV | SessionFlags::PORT);

    match setup_pasv_listener(session.pasv_ip, session.context.socket_buffer_size) {
        Ok((listener, addr)) => {
            info!("PASV listener bound to {}", addr);
            session.pasv = Some(listener);
            session.flags.insert(SessionFlags::PASV);
            session.send_response(Reply::new(227, FtpAddress(addr).to_string()));
        }
        Err(e) => {
            error!("Failed to set up PASV listener: {}", e);
            session.send_response(FtpError::Socket(e).to_ftp_response());
        }
    }
}

/// Sets up a passive mode (PASV) listener.
/// Returns the non-blocking listener and the address it is bound to.
pub fn setup_pasv_listener(
    ip: Ipv4Addr,
    buffer_size: usize,
) -> io::Result<(TcpListener, SocketAddrV4)> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    set_options(SockRef::from(&socket), buffer_size)?;
    socket.bind(&SockAddr::from(SocketAddrV4::new(ip, 0)))?;
    socket.listen(PASV_BACKLOG)?;
    socket.set_nonblocking(true)?;

    let listener: TcpListener = socket.into();
    match listener.local_addr()? {
        SocketAddr::V4(addr) => {
            debug!("PASV listener set up on IP: {}, Port: {}", addr.ip(), addr.port());
            Ok((listener, addr))
        }
        SocketAddr::V6(addr) => Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("unexpected IPv6 PASV address {}", addr),
        )),
    }
}

/// Accepts the incoming connection on the passive listener.
pub fn accept_pasv_connection(listener: &TcpListener) -> io::Result<TcpStream> {
    let (data_stream, addr) = listener.accept()?;
    data_stream.set_nonblocking(true)?;
    debug!("Accepted data connection from: {}", addr);
    Ok(data_stream)
}
