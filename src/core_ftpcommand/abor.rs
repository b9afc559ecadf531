use crate::core_ftpcommand::reply::Reply;
use crate::session::{CloseMask, Session, SessionState};
use log::info;

/// Handles the ABOR FTP command.
///
/// Tears down any pending or running transfer regardless of its progress.
/// With nothing to abort the client just gets a 225.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `_arg` - Ignored.
pub fn handle_abor_command(session: &mut Session, _arg: &str) {
    if session.state() == SessionState::Command {
        session.send_response(Reply::new(225, "No transfer to abort"));
        return;
    }

    info!("[session {}] transfer aborted by client", session.id());
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.send_response(Reply::new(225, "Aborted"));
    session.send_response(Reply::new(425, "Transfer aborted"));
}
