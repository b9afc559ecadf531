// src/constants.rs

/// Size of the scratch buffer used for file and listing transfers.
pub const XFER_BUFFERSIZE: usize = 0x4000;
/// Default SO_RCVBUF/SO_SNDBUF applied to data and passive sockets.
pub const SOCK_BUFFERSIZE: usize = 0x4000;
/// Capacity of the inbound command buffer. Overflowing it kills the session.
pub const CMD_BUFFERSIZE: usize = 0x1000;
/// Largest chunk handed to a single send() during RETR.
pub const RETR_CHUNK_SIZE: usize = 0x1000;

/// Longest absolute path the path builder will produce.
pub const MAX_PATH_LEN: usize = 0x300;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 5000;
pub const DEFAULT_ROOT_DIR: &str = "/var/ftp";
pub const DEFAULT_RESERVED_PATH: &str = "/log.txt";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

pub const LISTEN_BACKLOG: i32 = 5;
pub const PASV_BACKLOG: i32 = 1;

/// How long a closing socket waits for the peer to hang up.
pub const CLOSE_WAIT_MS: u16 = 250;

/// Telnet "Data Mark", terminates the in-band part of an urgent sequence.
pub const TELNET_DATA_MARK: u8 = 0xF2;

pub const GREETING: &str = "Hello!";
