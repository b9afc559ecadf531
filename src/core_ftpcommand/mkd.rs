use crate::core_fs::{EntryType, FsError};
use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::{error, info, warn};

/// Handles the MKD (and XMKD) FTP command.
///
/// Creating a directory that already exists is reported as success.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The directory to create.
pub fn handle_mkd_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] MKD {:?}: {}", session.id(), arg, e);
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    let created = match session.context.fs.create_dir(&path) {
        Err(FsError::AlreadyExists) => match session.context.fs.entry_type(&path) {
            Ok(EntryType::Directory) => Ok(()),
            _ => Err(FsError::AlreadyExists),
        },
        other => other,
    };

    match created {
        Ok(()) => {
            info!("[session {}] created directory {}", session.id(), path);
            session.send_response(Reply::new(250, "OK"));
            session.log_free_space();
        }
        Err(e) => {
            error!("[session {}] failed to create {}: {}", session.id(), path, e);
            session.send_response(Reply::new(550, "failed to create directory"));
        }
    }
}
