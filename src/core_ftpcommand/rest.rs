use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;
use log::debug;

/// Handles the REST FTP command.
///
/// The offset applies to the next RETR or STOR only. An empty argument resets it.
pub fn handle_rest_command(session: &mut Session, arg: &str) {
    if !arg.bytes().all(|b| b.is_ascii_digit()) {
        session.send_response(Reply::new(504, "invalid argument"));
        return;
    }

    let offset = if arg.is_empty() {
        Some(0)
    } else {
        arg.parse::<u64>().ok()
    };

    match offset {
        Some(offset) => {
            debug!("[session {}] restart offset {}", session.id(), offset);
            session.restart = offset;
            session.send_response(Reply::new(200, "OK"));
        }
        None => session.send_response(Reply::new(504, "invalid argument")),
    }
}
