use crate::core_fs::FsError;
use crate::core_ftpcommand::reply::Reply;
use crate::helpers::PathError;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("Failed to listen on {addr}: {source}")]
    Listen { addr: SocketAddr, source: io::Error },

    #[error("Failed to accept connection: {0}")]
    Accept(io::Error),

    #[error("Socket error: {0}")]
    Socket(io::Error),

    #[error("{0}")]
    Path(#[from] PathError),

    #[error("{0}")]
    Fs(#[from] FsError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FtpError {
    /// Reply sent to the client when this error ends a transfer request.
    pub fn to_ftp_response(&self) -> Reply {
        match self {
            FtpError::Path(e) => Reply::new(553, e.to_string()),
            FtpError::Fs(_) => Reply::new(450, "failed to open file"),
            FtpError::Accept(_) => Reply::new(425, "Failed to establish connection"),
            FtpError::Socket(e) | FtpError::Io(e) => Reply::new(451, e.to_string()),
            FtpError::Bind { .. } | FtpError::Listen { .. } => {
                Reply::new(451, "Requested action aborted. Local error in processing.")
            }
        }
    }
}
