use crate::constants::{CMD_BUFFERSIZE, TELNET_DATA_MARK, XFER_BUFFERSIZE};
use crate::context::Context;
use crate::core_fs::{DirHandle, EntryType, FileHandle, FsError, OpenMode};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::CommandTable;
use crate::core_ftpcommand::reply::Reply;
use crate::core_network::{pasv, port, socket};
use crate::core_transfer::listing::MlstFacts;
use crate::core_transfer::{self, Direction, LoopStatus, Transfer};
use crate::error::FtpError;
use crate::helpers::{decode_path, encode_path, format_free_space};
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use log::{debug, error, info, log_enabled, trace, warn, Level};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, TcpListener, TcpStream};
use std::os::fd::{AsFd, BorrowedFd};
use std::sync::Arc;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SessionFlags: u32 {
        const BINARY = 1 << 0;
        /// A passive listener is armed.
        const PASV = 1 << 1;
        /// A PORT address is armed.
        const PORT = 1 << 2;
        const RECV = 1 << 3;
        const SEND = 1 << 4;
        /// Set between a successful RNFR and the next command.
        const RENAME = 1 << 5;
        /// Telnet urgent sequence in progress on the control connection.
        const URGENT = 1 << 6;
    }
}

bitflags! {
    /// Which secondary sockets a state change tears down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CloseMask: u8 {
        const PASV = 1 << 0;
        const DATA = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Command,
    DataConnect,
    DataTransfer,
}

/// One client: its control connection, optional data sockets and transfer progress.
pub struct Session {
    pub(crate) id: u64,
    pub(crate) cwd: String,
    /// Directory being listed, used to resolve entry names.
    pub(crate) lwd: String,
    control: Option<TcpStream>,
    pub(crate) pasv: Option<TcpListener>,
    pub(crate) data: Option<TcpStream>,
    /// STAT listings stream over the control connection instead of `data`.
    pub(crate) data_over_control: bool,
    pub(crate) peer_addr: Option<SocketAddrV4>,
    pub(crate) pasv_ip: Ipv4Addr,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) flags: SessionFlags,
    pub(crate) mlst_facts: MlstFacts,
    pub(crate) state: SessionState,
    pub(crate) rn_type: Option<EntryType>,
    pub(crate) rename_from: Option<String>,
    pub(crate) transfer: Transfer,
    pub(crate) file: Option<Box<dyn FileHandle>>,
    pub(crate) dir: Option<Box<dyn DirHandle>>,
    pub(crate) buffer: Vec<u8>,
    pub(crate) bufferpos: usize,
    pub(crate) buffersize: usize,
    cmd_buffer: Vec<u8>,
    cmd_len: usize,
    pub(crate) filepos: u64,
    pub(crate) filesize: u64,
    /// Bytes moved by the current file transfer, excluding any restart offset.
    pub(crate) transferred: u64,
    /// Offset requested by REST, consumed by the next file transfer.
    pub(crate) restart: u64,
    pub(crate) context: Arc<Context>,
}

impl Session {
    pub fn new(id: u64, control: TcpStream, context: Arc<Context>) -> io::Result<Self> {
        let pasv_ip = match control.local_addr()?.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(ip) => ip.to_ipv4_mapped().unwrap_or(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Self {
            id,
            cwd: String::from("/"),
            lwd: String::from("/"),
            control: Some(control),
            pasv: None,
            data: None,
            data_over_control: false,
            peer_addr: None,
            pasv_ip,
            timestamp: context.clock.now(),
            flags: SessionFlags::empty(),
            mlst_facts: MlstFacts::default(),
            state: SessionState::Command,
            rn_type: None,
            rename_from: None,
            transfer: Transfer::Idle,
            file: None,
            dir: None,
            buffer: vec![0; XFER_BUFFERSIZE],
            bufferpos: 0,
            buffersize: 0,
            cmd_buffer: vec![0; CMD_BUFFERSIZE],
            cmd_len: 0,
            filepos: 0,
            filesize: 0,
            transferred: 0,
            restart: 0,
            context,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    /// Writes a reply on the control connection. A failed write ends the session.
    pub fn send_response(&mut self, reply: Reply) {
        let text = reply.to_string();
        let result = match self.control.as_mut() {
            Some(control) => control.write_all(text.as_bytes()),
            None => return,
        };

        match result {
            Ok(()) => debug!("[session {}] -> {}", self.id, text.trim_end()),
            Err(e) => {
                error!("[session {}] Failed to send reply: {}", self.id, e);
                self.close_control();
            }
        }
    }

    /// Moves to `state`, closing the sockets named by `mask`.
    ///
    /// Entering COMMAND also closes the open file and directory and disarms
    /// the transfer engine; it is the only place those handles are released.
    pub fn set_state(&mut self, state: SessionState, mask: CloseMask) {
        self.state = state;

        if mask.contains(CloseMask::PASV) {
            if self.pasv.take().is_some() {
                trace!("[session {}] closed passive listener", self.id);
            }
            self.flags.remove(SessionFlags::PASV);
        }

        if mask.contains(CloseMask::DATA) {
            if let Some(data) = self.data.take() {
                socket::close_stream(data);
            }
            self.data_over_control = false;
        }

        if state == SessionState::Command {
            if let Some(mut file) = self.file.take() {
                if self.flags.contains(SessionFlags::RECV) {
                    if let Err(e) = file.flush() {
                        warn!("[session {}] Failed to flush file: {}", self.id, e);
                    }
                }
            }
            self.dir = None;
            self.transfer = Transfer::Idle;
            self.data_over_control = false;
        }
    }

    pub fn close_control(&mut self) {
        self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
        if let Some(control) = self.control.take() {
            info!("[session {}] Closing control connection", self.id);
            socket::close_stream(control);
        }
    }

    /// Opens a file for transfer, refusing the reserved path.
    pub(crate) fn open_file(
        &self,
        path: &str,
        mode: OpenMode,
    ) -> Result<Box<dyn FileHandle>, FtpError> {
        if self.context.is_reserved(path) {
            warn!("[session {}] Refusing to open reserved path {}", self.id, path);
            return Err(FsError::ReservedPath.into());
        }
        Ok(self.context.fs.open(path, mode)?)
    }

    pub(crate) fn log_free_space(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        match self.context.fs.free_space(&self.cwd) {
            Ok(bytes) => debug!("Free space: {}", format_free_space(bytes)),
            Err(e) => debug!("Free space unavailable: {}", e),
        }
    }

    /// Copies one formatted line plus CRLF into the transfer buffer.
    pub(crate) fn fill_buffer(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let len = bytes.len().min(self.buffer.len() - 2);
        self.buffer[..len].copy_from_slice(&bytes[..len]);
        self.buffer[len..len + 2].copy_from_slice(b"\r\n");
        self.bufferpos = 0;
        self.buffersize = len + 2;
    }

    fn data_stream(&self) -> io::Result<&TcpStream> {
        let stream = if self.data_over_control {
            self.control.as_ref()
        } else {
            self.data.as_ref()
        };
        stream.ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }

    pub(crate) fn data_write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut stream = self.data_stream()?;
        stream.write(buf)
    }

    pub(crate) fn data_read(&mut self) -> io::Result<usize> {
        let mut stream = match self.data.as_ref() {
            Some(stream) => stream,
            None => return Err(io::Error::from(io::ErrorKind::NotConnected)),
        };
        stream.read(&mut self.buffer)
    }

    /// Starts the PORT connection for a transfer that just entered DATA_CONNECT.
    pub(crate) fn connect(&mut self) -> io::Result<()> {
        self.flags.remove(SessionFlags::PORT);
        let peer = self
            .peer_addr
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no PORT address"))?;

        let (stream, connected) = port::connect_data(peer, self.context.socket_buffer_size)?;
        self.data = Some(stream);

        if connected {
            info!("[session {}] connected to {}", self.id, peer);
            self.set_state(SessionState::DataTransfer, CloseMask::PASV);
            self.send_response(Reply::new(150, "Ready"));
        } else {
            debug!("[session {}] connecting to {}", self.id, peer);
        }
        Ok(())
    }

    fn finish_connect(&mut self) {
        let pending = match self.data.as_ref() {
            Some(stream) => stream.take_error(),
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        };

        match pending {
            Ok(None) => {
                if let Some(peer) = self.peer_addr {
                    info!("[session {}] connected to {}", self.id, peer);
                }
                self.set_state(SessionState::DataTransfer, CloseMask::PASV);
                self.send_response(Reply::new(150, "Ready"));
            }
            Ok(Some(e)) | Err(e) => {
                error!("[session {}] connect: {}", self.id, e);
                self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                self.send_response(Reply::new(425, "can't open data connection"));
            }
        }
    }

    fn accept_pasv(&mut self) {
        let accepted = match self.pasv.as_ref() {
            Some(listener) => pasv::accept_pasv_connection(listener),
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        };

        match accepted {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Ok(stream) => {
                self.set_state(SessionState::DataTransfer, CloseMask::PASV);
                self.data = Some(stream);
                self.send_response(Reply::new(150, "Ready"));
            }
            Err(e) => {
                error!("[session {}] Failed to accept data connection: {}", self.id, e);
                self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                self.send_response(Reply::new(425, "Failed to establish connection"));
            }
        }
    }

    /// The passive or data socket relevant to the current state, with the
    /// readiness it is waiting for.
    fn secondary_fd(&self) -> Option<(BorrowedFd<'_>, PollFlags)> {
        match self.state {
            SessionState::Command => None,
            SessionState::DataConnect => {
                if self.flags.contains(SessionFlags::PASV) {
                    self.pasv.as_ref().map(|l| (l.as_fd(), PollFlags::POLLIN))
                } else {
                    self.data.as_ref().map(|s| (s.as_fd(), PollFlags::POLLOUT))
                }
            }
            SessionState::DataTransfer => {
                let events = if self.flags.contains(SessionFlags::RECV) {
                    PollFlags::POLLIN
                } else {
                    PollFlags::POLLOUT
                };
                self.data_stream().ok().map(|s| (s.as_fd(), events))
            }
        }
    }

    /// Advances the session by whatever its sockets are ready for.
    ///
    /// Never blocks waiting for readiness. Command input is handled before
    /// the data side, and data readiness observed before a command changed
    /// the state is dropped.
    pub fn poll(&mut self, commands: &CommandTable) {
        if self.control.is_none() {
            return;
        }

        if self.state != SessionState::Command && self.secondary_fd().is_none() {
            error!("[session {}] {:?} without a data socket", self.id, self.state);
            self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
            self.send_response(Reply::new(426, "Data connection failed"));
        }

        let polled_state = self.state;
        let (rc, control_events, secondary_events) = {
            let Some(control) = self.control.as_ref() else {
                return;
            };
            let mut fds = Vec::with_capacity(2);
            fds.push(PollFd::new(
                control.as_fd(),
                PollFlags::POLLIN | PollFlags::POLLPRI,
            ));
            if let Some((fd, events)) = self.secondary_fd() {
                fds.push(PollFd::new(fd, events));
            }

            let rc = poll(&mut fds, PollTimeout::ZERO);
            let control_events = fds[0].revents().unwrap_or(PollFlags::empty());
            let secondary_events = fds
                .get(1)
                .and_then(|fd| fd.revents())
                .unwrap_or(PollFlags::empty());
            (rc, control_events, secondary_events)
        };

        match rc {
            Ok(0) | Err(Errno::EINTR) => return,
            Ok(_) => {}
            Err(e) => {
                error!("[session {}] poll: {}", self.id, e);
                self.close_control();
                return;
            }
        }

        let failure = PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL;

        if control_events.intersects(failure) {
            debug!("[session {}] control revents={:?}", self.id, control_events);
            self.close_control();
            return;
        } else if control_events.intersects(PollFlags::POLLIN | PollFlags::POLLPRI) {
            self.read_command(control_events, commands);
        }

        if !self.is_connected() || self.state != polled_state || secondary_events.is_empty() {
            return;
        }

        match self.state {
            SessionState::Command => {}
            SessionState::DataConnect => {
                if !self.flags.contains(SessionFlags::PASV) {
                    // A refused connect shows up as POLLERR; take_error reports why.
                    self.finish_connect();
                } else if secondary_events.intersects(failure) {
                    warn!("[session {}] data connection failed: {:?}", self.id, secondary_events);
                    self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                    self.send_response(Reply::new(426, "Data connection failed"));
                } else if secondary_events.contains(PollFlags::POLLIN) {
                    self.accept_pasv();
                }
            }
            SessionState::DataTransfer => {
                let ready = PollFlags::POLLIN | PollFlags::POLLOUT;
                if secondary_events.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL)
                    || !secondary_events.intersects(ready)
                {
                    warn!("[session {}] data connection failed: {:?}", self.id, secondary_events);
                    self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                    self.send_response(Reply::new(426, "Data connection failed"));
                } else {
                    self.run_transfer();
                }
            }
        }
    }

    /// Drives the armed transfer engine until it would block or finishes.
    fn run_transfer(&mut self) {
        loop {
            let status = match self.transfer {
                Transfer::Idle => LoopStatus::Exit,
                Transfer::File(Direction::Retrieve) => core_transfer::file::retrieve_transfer(self),
                Transfer::File(Direction::Store) => core_transfer::file::store_transfer(self),
                Transfer::Listing(mode) => core_transfer::listing::list_transfer(self, mode),
            };
            if status != LoopStatus::Continue {
                break;
            }
        }
    }

    fn read_command(&mut self, events: PollFlags, commands: &CommandTable) {
        if events.contains(PollFlags::POLLPRI) {
            self.read_urgent();
            return;
        }

        if self.cmd_len == self.cmd_buffer.len() {
            error!("[session {}] Exceeded command buffer size", self.id);
            self.close_control();
            return;
        }

        let received = match self.control.as_mut() {
            Some(control) => control.read(&mut self.cmd_buffer[self.cmd_len..]),
            None => return,
        };

        match received {
            Ok(0) => {
                debug!("[session {}] peer closed connection", self.id);
                self.close_control();
                return;
            }
            Ok(n) => self.cmd_len += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::Interrupted => {
                return
            }
            Err(e) => {
                error!("[session {}] recv: {}", self.id, e);
                self.close_control();
                return;
            }
        }

        if self.flags.contains(SessionFlags::URGENT) {
            // Everything up to and including the data mark belongs to the interrupt.
            if let Some(mark) = self.cmd_buffer[..self.cmd_len]
                .iter()
                .position(|&b| b == TELNET_DATA_MARK)
            {
                self.consume_command_bytes(mark + 1);
                self.flags.remove(SessionFlags::URGENT);
            }
        }

        while self.is_connected() {
            let Some((end, next)) = find_line(&self.cmd_buffer[..self.cmd_len]) else {
                return;
            };

            let mut line = self.cmd_buffer[..end].to_vec();
            self.consume_command_bytes(next);

            decode_path(&mut line);
            let (verb, args) = split_command(&line);
            self.execute(&verb, &args, commands);
        }
    }

    fn read_urgent(&mut self) {
        self.flags.insert(SessionFlags::URGENT);

        let Some(control) = self.control.as_ref() else {
            return;
        };

        let result = match socket::at_mark(control) {
            Ok(false) => {
                let mut scratch = [0u8; CMD_BUFFERSIZE];
                socket::discard_inband(control, &mut scratch).map(|n| {
                    trace!("[session {}] discarded {} in-band bytes", self.id, n);
                    false
                })
            }
            Ok(true) => {
                let mut oob = [0u8; 1];
                socket::recv_oob(control, &mut oob).map(|_| {
                    trace!("[session {}] urgent byte 0x{:02X}", self.id, oob[0]);
                    true
                })
            }
            Err(e) => Err(e),
        };

        match result {
            // The partial command preceding the interrupt is abandoned.
            Ok(true) => self.cmd_len = 0,
            Ok(false) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                error!("[session {}] urgent data: {}", self.id, e);
                self.close_control();
            }
        }
    }

    fn consume_command_bytes(&mut self, count: usize) {
        self.cmd_buffer.copy_within(count..self.cmd_len, 0);
        self.cmd_len -= count;
    }

    fn execute(&mut self, verb: &str, args: &str, commands: &CommandTable) {
        self.timestamp = self.context.clock.now();

        let found = FtpCommand::from_str(verb)
            .and_then(|command| commands.get(&command).map(|handler| (command, *handler)));

        let Some((command, handler)) = found else {
            warn!("[session {}] Unknown command {:?}", self.id, verb);
            let mut text = format!("Invalid command \"{}", encode_path(verb, false));
            if !args.is_empty() {
                text.push(' ');
                text.push_str(&encode_path(args, false));
            }
            text.push('"');
            self.send_response(Reply::new(502, text));
            return;
        };

        if command == FtpCommand::PASS {
            debug!("[session {}] <- PASS ****", self.id);
        } else {
            debug!("[session {}] <- {} {}", self.id, verb, args);
        }

        if self.state != SessionState::Command {
            if !command.allowed_during_transfer() {
                warn!("[session {}] {:?} refused during transfer", self.id, command);
                self.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                self.send_response(Reply::new(503, "Bad sequence of commands"));
                return;
            }
        } else {
            if command != FtpCommand::RNTO {
                self.flags.remove(SessionFlags::RENAME);
            }
            if !command.allowed_during_transfer() {
                self.set_state(SessionState::Command, CloseMask::empty());
            }
        }

        handler(self, args);
    }
}

/// Finds the first `\r\n` or `\n`, returning the line end and where the next line starts.
fn find_line(buf: &[u8]) -> Option<(usize, usize)> {
    buf.iter().enumerate().find_map(|(i, &b)| match b {
        b'\r' if buf.get(i + 1) == Some(&b'\n') => Some((i, i + 2)),
        b'\n' => Some((i, i + 1)),
        _ => None,
    })
}

/// Splits a command line at its first whitespace character.
fn split_command(line: &[u8]) -> (String, String) {
    match line.iter().position(|b| b.is_ascii_whitespace()) {
        Some(space) => (
            String::from_utf8_lossy(&line[..space]).into_owned(),
            String::from_utf8_lossy(&line[space + 1..]).into_owned(),
        ),
        None => (String::from_utf8_lossy(line).into_owned(), String::new()),
    }
}
