use crate::core_transfer::listing::ListingMode;
use crate::core_transfer::xfer_dir;
use crate::session::Session;

/// Handles the LIST FTP command.
///
/// Some clients send `ls` style flags (`LIST -al`); those are dropped if the
/// argument does not name anything.
pub fn handle_list_command(session: &mut Session, arg: &str) {
    xfer_dir(session, arg, ListingMode::List, true);
}
