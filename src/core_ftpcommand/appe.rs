use crate::core_transfer::{xfer_file, FileMode};
use crate::session::Session;

/// Handles the APPE FTP command: like STOR, but writes start at the end of the file.
pub fn handle_appe_command(session: &mut Session, arg: &str) {
    xfer_file(session, arg, FileMode::Appe);
}
