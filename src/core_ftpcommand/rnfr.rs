use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::{Session, SessionFlags};
use log::{debug, warn};

/// Handles the RNFR FTP command.
///
/// Remembers the source of a rename. The next command must be RNTO or the
/// pending rename is dropped.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The entry to rename.
pub fn handle_rnfr_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.entry_type(&path) {
        Ok(entry_type) => {
            debug!("[session {}] rename source {} ({:?})", session.id(), path, entry_type);
            session.rn_type = Some(entry_type);
            session.rename_from = Some(path);
            session.flags.insert(SessionFlags::RENAME);
            session.send_response(Reply::new(350, "OK"));
        }
        Err(e) => {
            warn!("[session {}] RNFR {}: {}", session.id(), path, e);
            session.send_response(Reply::new(450, "no such file or directory"));
        }
    }
}
