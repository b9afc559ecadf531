use crate::core_ftpcommand::reply::Reply;
use crate::helpers::encode_path;
use crate::session::Session;

pub fn handle_pwd_command(session: &mut Session, _arg: &str) {
    let text = format!("\"{}\"", encode_path(&session.cwd, true));
    session.send_response(Reply::new(257, text));
}
