use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

pub fn handle_noop_command(session: &mut Session, _arg: &str) {
    session.send_response(Reply::new(200, "OK"));
}
