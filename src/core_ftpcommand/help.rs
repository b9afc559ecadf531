use crate::core_ftpcommand::reply::Reply;
use crate::session::Session;

pub fn handle_help_command(session: &mut Session, _arg: &str) {
    let reply = Reply::multi(214, "The following commands are recognized")
        .line(" ABOR ALLO APPE CDUP CWD DELE FEAT HELP LIST MDTM MKD MLSD")
        .line(" MLST MODE NLST NOOP OPTS PASS PASV PORT PWD QUIT REST RETR")
        .line(" RMD RNFR RNTO SIZE STAT STOR STOU STRU SYST TYPE USER XCUP XCWD XMKD XPWD XRMD");
    session.send_response(reply);
}
