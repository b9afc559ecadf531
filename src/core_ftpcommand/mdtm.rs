use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::warn;

/// Handles the MDTM FTP command, replying with the UTC modification time.
pub fn handle_mdtm_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.modify_time(&path) {
        Ok(modified) => {
            let stamp = modified.format("%Y%m%d%H%M%S").to_string();
            session.send_response(Reply::new(213, stamp));
        }
        Err(e) => {
            warn!("[session {}] MDTM {}: {}", session.id(), path, e);
            session.send_response(Reply::new(550, "Error getting mtime"));
        }
    }
}
