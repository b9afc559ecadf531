use crate::core_transfer::listing::ListingMode;
use crate::core_transfer::xfer_dir;
use crate::session::Session;

pub fn handle_mlsd_command(session: &mut Session, arg: &str) {
    xfer_dir(session, arg, ListingMode::Mlsd, false);
}
