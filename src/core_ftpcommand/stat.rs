use crate::core_ftpcommand::reply::Reply;
use crate::core_transfer::listing::ListingMode;
use crate::core_transfer::xfer_dir;
use crate::session::{Session, SessionState};

/// Handles the STAT FTP command.
///
/// During a transfer it reports progress without disturbing it. In command
/// state it reports uptime, or with an argument lists that path over the
/// control connection.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - Optional path to list.
pub fn handle_stat_command(session: &mut Session, arg: &str) {
    match session.state() {
        SessionState::DataConnect => {
            let reply = Reply::multi(211, "FTP server status").line(" Waiting for data connection");
            session.send_response(reply);
        }
        SessionState::DataTransfer => {
            let reply = Reply::multi(211, "FTP server status")
                .line(format!(" Transferred {} bytes", session.transferred));
            session.send_response(reply);
        }
        SessionState::Command if arg.is_empty() => {
            let uptime = (session.context.clock.now() - session.context.start_time)
                .num_seconds()
                .max(0);
            let reply = Reply::multi(211, "FTP server status").line(format!(
                " Uptime: {:02}:{:02}:{:02}",
                uptime / 3600,
                (uptime / 60) % 60,
                uptime % 60
            ));
            session.send_response(reply);
        }
        SessionState::Command => xfer_dir(session, arg, ListingMode::Stat, false),
    }
}
