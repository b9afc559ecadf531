use std::io;
use thiserror::Error;

/// Failures reported by the filesystem collaborator.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("No such file or directory")]
    NotFound,

    #[error("File exists")]
    AlreadyExists,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Is a directory")]
    IsADirectory,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Path is reserved by the server")]
    ReservedPath,

    #[error("{0}")]
    Io(io::Error),
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            _ => match error.raw_os_error() {
                Some(libc::ENOTDIR) => FsError::NotADirectory,
                Some(libc::EISDIR) => FsError::IsADirectory,
                _ => FsError::Io(error),
            },
        }
    }
}
