use crate::core_transfer::{xfer_file, FileMode};
use crate::session::Session;

/// Handles the RETR FTP command.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The file to send to the client.
pub fn handle_retr_command(session: &mut Session, arg: &str) {
    xfer_file(session, arg, FileMode::Retr);
}
