use crate::core_transfer::{xfer_file, FileMode};
use crate::session::Session;

/// Handles the STOR FTP command. A pending REST offset keeps the existing contents.
pub fn handle_stor_command(session: &mut Session, arg: &str) {
    xfer_file(session, arg, FileMode::Stor);
}
