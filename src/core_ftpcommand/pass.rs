use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

/// Handles the PASS FTP command. Any password is accepted.
pub fn handle_pass_command(session: &mut Session, _arg: &str) {
    session.send_response(Reply::new(230, "OK"));
}
