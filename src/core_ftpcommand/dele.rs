use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::{error, info, warn};

/// Handles the DELE FTP command.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The file to delete.
pub fn handle_dele_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] DELE {:?}: {}", session.id(), arg, e);
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.delete_file(&path) {
        Ok(()) => {
            info!("[session {}] deleted {}", session.id(), path);
            session.send_response(Reply::new(250, "OK"));
            session.log_free_space();
        }
        Err(e) => {
            error!("[session {}] failed to delete {}: {}", session.id(), path, e);
            session.send_response(Reply::new(550, "failed to delete file"));
        }
    }
}
