//! Storage collaborator consumed by the session engine.
//!
//! Every path handed to these traits is an absolute, already validated client
//! path such as `/sub/file.txt`. Implementations map it onto their backing
//! store; the engine never sees host paths.

pub mod error;
pub mod local;

pub use error::FsError;
pub use local::LocalFileSystem;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create the file, truncating it unless a restart offset is pending.
    Write { truncate: bool },
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub entry_type: EntryType,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Unix permission bits (`st_mode & 0o7777`).
    pub mode: u32,
}

/// An open file. Dropping the handle closes it.
pub trait FileHandle: Send {
    /// Reads up to `buf.len()` bytes starting at `offset`. Returns 0 at end of file.
    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Writes `data` at `offset`, returning how much was written.
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, FsError>;

    fn size(&self) -> Result<u64, FsError>;

    fn flush(&mut self) -> Result<(), FsError>;
}

/// An open directory, yielding entry names without `.` and `..`.
pub trait DirHandle: Send {
    fn next_entry(&mut self) -> Option<Result<String, FsError>>;
}

/// Operations the engine needs from a mounted volume.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>, FsError>;

    fn open_dir(&self, path: &str) -> Result<Box<dyn DirHandle>, FsError>;

    fn create_dir(&self, path: &str) -> Result<(), FsError>;

    fn delete_file(&self, path: &str) -> Result<(), FsError>;

    fn delete_dir(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError>;

    fn entry_type(&self, path: &str) -> Result<EntryType, FsError>;

    fn stat(&self, path: &str) -> Result<Metadata, FsError>;

    /// Like `stat`, but describes a symbolic link itself instead of its target.
    fn lstat(&self, path: &str) -> Result<Metadata, FsError>;

    /// Bytes available on the volume holding `path`.
    fn free_space(&self, path: &str) -> Result<u64, FsError>;

    fn modify_time(&self, path: &str) -> Result<DateTime<Utc>, FsError> {
        Ok(self.stat(path)?.modified)
    }
}
