use crate::core_fs::EntryType;
use crate::core_ftpcommand::cdup::handle_cdup_command;
use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::{info, warn};

/// Handles the CWD (and XCWD) FTP command.
///
/// Resolves the argument against the current directory and switches to it
/// if it names a directory. Every failure is reported with 553.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The directory to change to, relative or absolute.
pub fn handle_cwd_command(session: &mut Session, arg: &str) {
    if arg == ".." {
        handle_cdup_command(session, arg);
        return;
    }

    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] CWD {:?}: {}", session.id(), arg, e);
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.entry_type(&path) {
        Ok(EntryType::Directory) => {
            info!("[session {}] cwd is now {}", session.id(), path);
            session.cwd = path;
            session.send_response(Reply::new(200, "OK"));
        }
        Ok(EntryType::File) => {
            warn!("[session {}] CWD to a file: {}", session.id(), path);
            session.send_response(Reply::new(553, "not a directory"));
        }
        Err(e) => {
            warn!("[session {}] CWD {}: {}", session.id(), path, e);
            session.send_response(Reply::new(553, e.to_string()));
        }
    }
}
