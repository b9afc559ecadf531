use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

/// Handles the STRU FTP command. Only file structure is supported.
pub fn handle_stru_command(session: &mut Session, arg: &str) {
    if arg.eq_ignore_ascii_case("F") {
        session.send_response(Reply::new(200, "OK"));
    } else {
        session.send_response(Reply::new(504, "unavailable"));
    }
}
