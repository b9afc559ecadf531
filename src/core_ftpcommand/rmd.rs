use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::{error, info, warn};

/// Handles the RMD (and XRMD) FTP command. Only empty directories are removed.
pub fn handle_rmd_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] RMD {:?}: {}", session.id(), arg, e);
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.delete_dir(&path, false) {
        Ok(()) => {
            info!("[session {}] removed directory {}", session.id(), path);
            session.send_response(Reply::new(250, "OK"));
            session.log_free_space();
        }
        Err(e) => {
            error!("[session {}] failed to remove {}: {}", session.id(), path, e);
            session.send_response(Reply::new(550, "failed to delete directory"));
        }
    }
}
