use crate::constants::CLOSE_WAIT_MS;
use log::{debug, trace};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::socket::{recv, MsgFlags};
use socket2::SockRef;
use std::io;
use std::net::{Shutdown, TcpStream};
use std::os::fd::{AsFd, AsRawFd};

/// Applies the configured kernel buffer sizes to a data or passive socket.
pub fn set_options(socket: SockRef<'_>, buffer_size: usize) -> io::Result<()> {
    socket.set_recv_buffer_size(buffer_size)?;
    socket.set_send_buffer_size(buffer_size)?;
    Ok(())
}

/// Half-closes `stream`, gives the peer a moment to hang up, then drops it.
pub fn close_stream(stream: TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Write) {
        if e.kind() != io::ErrorKind::NotConnected {
            debug!("shutdown: {}", e);
        }
        return;
    }

    let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::from(CLOSE_WAIT_MS)) {
        Ok(0) => trace!("peer did not close within {} ms", CLOSE_WAIT_MS),
        Ok(_) => {}
        Err(e) => debug!("poll on close: {}", e),
    }
}

// POSIX.1-2001, provided by the C library but not bound by the libc crate.
extern "C" {
    fn sockatmark(fd: libc::c_int) -> libc::c_int;
}

/// Whether the next byte to read is the urgent (OOB) byte.
pub fn at_mark(stream: &TcpStream) -> io::Result<bool> {
    // SAFETY: sockatmark only inspects the descriptor, which is owned by
    // `stream` and stays open for the call.
    let rc = unsafe { sockatmark(stream.as_raw_fd()) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(rc == 1)
}

/// Reads the pending urgent byte.
pub fn recv_oob(stream: &TcpStream, buf: &mut [u8]) -> io::Result<usize> {
    Ok(recv(stream.as_raw_fd(), buf, MsgFlags::MSG_OOB)?)
}

/// Reads and throws away in-band bytes that precede the urgent mark.
pub fn discard_inband(stream: &TcpStream, buf: &mut [u8]) -> io::Result<usize> {
    Ok(recv(stream.as_raw_fd(), buf, MsgFlags::MSG_DONTWAIT)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn urgent_byte_is_read_at_the_mark() {
        let (mut client, server) = pair();
        assert!(!at_mark(&server).unwrap());

        client.write_all(b"ab").unwrap();
        SockRef::from(&client).send_out_of_band(b"!").unwrap();

        let mut fds = [PollFd::new(server.as_fd(), PollFlags::POLLPRI)];
        assert_eq!(poll(&mut fds, PollTimeout::from(5000u16)).unwrap(), 1);

        assert!(!at_mark(&server).unwrap());
        let mut buf = [0u8; 16];
        assert_eq!(discard_inband(&server, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ab");

        assert!(at_mark(&server).unwrap());
        let mut oob = [0u8; 1];
        assert_eq!(recv_oob(&server, &mut oob).unwrap(), 1);
        assert_eq!(oob[0], b'!');
    }
}
