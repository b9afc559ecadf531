use crate::core_transfer::listing::ListingMode;
use crate::core_transfer::xfer_dir;
use crate::session::Session;

/// Handles the MLST FTP command. The single fact line goes over the control connection.
pub fn handle_mlst_command(session: &mut Session, arg: &str) {
    xfer_dir(session, arg, ListingMode::Mlst, false);
}
