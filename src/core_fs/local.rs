use crate::core_fs::{DirHandle, EntryType, FileHandle, FileSystem, FsError, Metadata, OpenMode};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fs::{self, File, OpenOptions, ReadDir};
use std::os::unix::fs::{FileExt, PermissionsExt};
use std::path::{Path, PathBuf};
use sysinfo::{DiskExt, System, SystemExt};

/// Serves client paths out of a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an absolute client path below the root directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

fn convert_metadata(metadata: fs::Metadata) -> Result<Metadata, FsError> {
    let modified: DateTime<Utc> = metadata.modified()?.into();
    Ok(Metadata {
        entry_type: if metadata.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        },
        size: metadata.len(),
        modified,
        mode: metadata.permissions().mode() & 0o7777,
    })
}

struct LocalFile {
    file: File,
}

impl FileHandle for LocalFile {
    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, FsError> {
        Ok(self.file.read_at(buf, offset)?)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, FsError> {
        Ok(self.file.write_at(data, offset)?)
    }

    fn size(&self) -> Result<u64, FsError> {
        Ok(self.file.metadata()?.len())
    }

    fn flush(&mut self) -> Result<(), FsError> {
        Ok(self.file.sync_data()?)
    }
}

struct LocalDir {
    entries: ReadDir,
}

impl DirHandle for LocalDir {
    fn next_entry(&mut self) -> Option<Result<String, FsError>> {
        self.entries.next().map(|entry| {
            entry
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .map_err(FsError::from)
        })
    }
}

impl FileSystem for LocalFileSystem {
    fn open(&self, path: &str, mode: OpenMode) -> Result<Box<dyn FileHandle>, FsError> {
        let host_path = self.resolve(path);
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Write { truncate } => {
                options.write(true).create(true).truncate(truncate);
            }
            // Writes are positional, so append is a plain non-truncating open.
            OpenMode::Append => {
                options.write(true).create(true);
            }
        }

        let file = options.open(&host_path)?;
        if file.metadata()?.is_dir() {
            return Err(FsError::IsADirectory);
        }
        debug!("Opened {:?} in {:?} mode", host_path, mode);
        Ok(Box::new(LocalFile { file }))
    }

    fn open_dir(&self, path: &str) -> Result<Box<dyn DirHandle>, FsError> {
        let entries = fs::read_dir(self.resolve(path))?;
        Ok(Box::new(LocalDir { entries }))
    }

    fn create_dir(&self, path: &str) -> Result<(), FsError> {
        Ok(fs::create_dir(self.resolve(path))?)
    }

    fn delete_file(&self, path: &str) -> Result<(), FsError> {
        let host_path = self.resolve(path);
        if fs::symlink_metadata(&host_path)?.is_dir() {
            return Err(FsError::IsADirectory);
        }
        Ok(fs::remove_file(host_path)?)
    }

    fn delete_dir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let host_path = self.resolve(path);
        if !fs::metadata(&host_path)?.is_dir() {
            return Err(FsError::NotADirectory);
        }
        if recursive {
            Ok(fs::remove_dir_all(host_path)?)
        } else {
            Ok(fs::remove_dir(host_path)?)
        }
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        Ok(fs::rename(self.resolve(from), self.resolve(to))?)
    }

    fn entry_type(&self, path: &str) -> Result<EntryType, FsError> {
        let metadata = fs::metadata(self.resolve(path))?;
        Ok(if metadata.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        })
    }

    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        convert_metadata(fs::metadata(self.resolve(path))?)
    }

    fn lstat(&self, path: &str) -> Result<Metadata, FsError> {
        convert_metadata(fs::symlink_metadata(self.resolve(path))?)
    }

    fn free_space(&self, path: &str) -> Result<u64, FsError> {
        let host_path = self.resolve(path);
        let host_path = fs::canonicalize(&host_path).unwrap_or(host_path);

        let mut sys = System::new();
        sys.refresh_disks_list();

        // Pick the most specific mount point containing the path.
        let disk = sys
            .disks()
            .iter()
            .filter(|disk| host_path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len());

        match disk {
            Some(disk) => Ok(disk.available_space()),
            None => {
                warn!("No disk found containing the path: {:?}", host_path);
                Err(FsError::NotFound)
            }
        }
    }
}
