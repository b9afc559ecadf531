use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;
use log::info;

/// Handles the USER FTP command. Every user name is accepted without a password check.
pub fn handle_user_command(session: &mut Session, arg: &str) {
    info!("[session {}] user {:?} logged in", session.id(), arg);
    session.send_response(Reply::new(230, "OK"));
}
