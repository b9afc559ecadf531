use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

/// Handles the MODE FTP command. Only stream mode is supported.
pub fn handle_mode_command(session: &mut Session, arg: &str) {
    if arg.eq_ignore_ascii_case("S") {
        session.send_response(Reply::new(200, "OK"));
    } else {
        session.send_response(Reply::new(504, "unavailable"));
    }
}
