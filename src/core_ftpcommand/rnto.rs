use crate::core_fs::EntryType;
use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::{Session, SessionFlags};
use log::{error, info, warn};

/// Handles the RNTO FTP command, completing the rename started by RNFR.
pub fn handle_rnto_command(session: &mut Session, arg: &str) {
    if !session.flags.contains(SessionFlags::RENAME) {
        warn!("[session {}] RNTO without RNFR", session.id());
        session.send_response(Reply::new(503, "Bad sequence of commands"));
        return;
    }
    session.flags.remove(SessionFlags::RENAME);

    let (Some(from), rn_type) = (session.rename_from.take(), session.rn_type.take()) else {
        session.send_response(Reply::new(503, "Bad sequence of commands"));
        return;
    };

    let to = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            session.send_response(Reply::new(554, e.to_string()));
            return;
        }
    };

    match session.context.fs.rename(&from, &to) {
        Ok(()) => {
            info!("[session {}] renamed {} to {}", session.id(), from, to);
            session.send_response(Reply::new(250, "OK"));
            session.log_free_space();
        }
        Err(e) => {
            error!("[session {}] rename {} to {}: {}", session.id(), from, to, e);
            let text = match rn_type {
                Some(EntryType::Directory) => "failed to rename directory",
                _ => "failed to rename file",
            };
            session.send_response(Reply::new(550, text));
        }
    }
}
