use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

/// Handles the FEAT FTP command, advertising the extensions and the current MLST facts.
pub fn handle_feat_command(session: &mut Session, _arg: &str) {
    let reply = Reply::multi(211, "Features:")
        .line(" MDTM")
        .line(format!(" MLST {}", session.mlst_facts.feat_line()))
        .line(" PASV")
        .line(" SIZE")
        .line(" TVFS")
        .line(" UTF8");
    session.send_response(reply);
}
