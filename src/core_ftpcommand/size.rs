use crate::core_ftpcommand::reply::Reply;
use crate::helpers::build_path;
use crate::session::Session;
use log::warn;

pub fn handle_size_command(session: &mut Session, arg: &str) {
    let path = match build_path(&session.cwd, arg) {
        Ok(path) => path,
        Err(e) => {
            session.send_response(Reply::new(553, e.to_string()));
            return;
        }
    };

    match session.context.fs.stat(&path) {
        Ok(metadata) => session.send_response(Reply::new(213, metadata.size.to_string())),
        Err(e) => {
            warn!("[session {}] SIZE {}: {}", session.id(), path, e);
            session.send_response(Reply::new(550, "Could not get file size."));
        }
    }
}
