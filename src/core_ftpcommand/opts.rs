use crate::core_ftpcommand::reply::Reply;
use crate::core_transfer::listing::MlstFacts;
use crate::session::Session;
use log::debug;

/// Handles the OPTS FTP command.
///
/// Understands the UTF8 toggles, which are always on, and `MLST <facts>`
/// which selects the facts reported by MLST and MLSD.
///
/// # Arguments
///
/// * `session` - The session receiving the command.
/// * `arg` - The option name followed by its value.
pub fn handle_opts_command(session: &mut Session, arg: &str) {
    if ["UTF8", "UTF8 ON", "UTF8 NLST"]
        .iter()
        .any(|option| arg.eq_ignore_ascii_case(option))
    {
        session.send_response(Reply::new(200, "OK"));
        return;
    }

    let (name, value) = match arg.split_once(' ') {
        Some((name, value)) => (name, value),
        None => (arg, ""),
    };

    if name.eq_ignore_ascii_case("MLST") {
        session.mlst_facts = MlstFacts::parse(value);
        debug!("[session {}] MLST facts {:?}", session.id(), session.mlst_facts);

        let enabled = session.mlst_facts.describe();
        let text = if enabled.is_empty() {
            String::from("MLST OPTS")
        } else {
            format!("MLST OPTS {}", enabled)
        };
        session.send_response(Reply::new(200, text));
        return;
    }

    session.send_response(Reply::new(504, "invalid argument"));
}
