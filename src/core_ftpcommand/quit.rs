use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;
use log::info;

/// Handles the QUIT FTP command and closes the control connection.
pub fn handle_quit_command(session: &mut Session, _arg: &str) {
    info!("[session {}] client quit", session.id());
    session.send_response(Reply::new(221, "disconnecting"));
    session.close_control();
}
