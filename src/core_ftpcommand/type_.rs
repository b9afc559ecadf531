use crate::core_ftpcommand::reply::Reply;
use crate::session::{Session, SessionFlags};

/// Handles the TYPE FTP command. Transfers are always binary, whatever the client asks for.
pub fn handle_type_command(session: &mut Session, _arg: &str) {
    session.flags.insert(SessionFlags::BINARY);
    session.send_response(Reply::new(200, "OK"));
}
