use crate::core_ftpcommand::reply::Reply;
use crate::helpers::cd_up;
use crate::session::Session;
use log::debug;

/// Handles the CDUP (and XCUP) FTP command. At the root it stays at `/`.
pub fn handle_cdup_command(session: &mut Session, _arg: &str) {
    session.cwd = cd_up(&session.cwd);
    debug!("[session {}] cwd is now {}", session.id(), session.cwd);
    session.send_response(Reply::new(200, "OK"));
}
