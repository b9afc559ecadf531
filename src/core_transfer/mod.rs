//! Resumable transfer loops driven by data socket readiness.
//!
//! A transfer command arms exactly one engine through [`Transfer`]; the
//! session calls the armed loop while the socket stays ready and the loop
//! returns [`LoopStatus::Exit`] as soon as it would block or has finished.

pub mod file;
pub mod listing;

use crate::core_fs::{EntryType, OpenMode};
use crate::core_ftpcommand::reply::Reply;
use crate::error::FtpError;
use crate::helpers::{base_name, build_path, encode_path};
use crate::session::{CloseMask, Session, SessionFlags, SessionState};
use listing::{ListingMode, MlstFacts};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Progress was made, call again.
    Continue,
    /// Wait for the next readiness event.
    Exit,
    /// The listener needs rebuilding.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Retrieve,
    Store,
}

/// The engine armed on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Idle,
    File(Direction),
    Listing(ListingMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Retr,
    Stor,
    Appe,
}

/// Rejects a transfer command and drops any pending data arrangement.
fn refuse(session: &mut Session, reply: Reply) {
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.send_response(reply);
}

/// Prepares a RETR, STOR or APPE and moves the session to DATA_CONNECT.
///
/// # Arguments
///
/// * `session` - The session that received the command.
/// * `args` - The client path of the file.
/// * `mode` - Which of the three file commands is running.
pub fn xfer_file(session: &mut Session, args: &str, mode: FileMode) {
    let restart = std::mem::take(&mut session.restart);

    let path = match build_path(&session.cwd, args) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] bad path {:?}: {}", session.id, args, e);
            refuse(session, Reply::new(553, e.to_string()));
            return;
        }
    };

    let open_mode = match mode {
        FileMode::Retr => OpenMode::Read,
        FileMode::Stor => OpenMode::Write {
            truncate: restart == 0,
        },
        FileMode::Appe => OpenMode::Append,
    };

    let opened = session
        .open_file(&path, open_mode)
        .and_then(|file| Ok((file.size().map_err(FtpError::from)?, file)));

    let (filesize, file) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            error!("[session {}] failed to open {}: {}", session.id, path, e);
            refuse(session, e.to_ftp_response());
            return;
        }
    };

    if !session
        .flags
        .intersects(SessionFlags::PASV | SessionFlags::PORT)
    {
        warn!("[session {}] {:?} without PASV or PORT", session.id, mode);
        refuse(session, Reply::new(503, "Bad sequence of commands"));
        return;
    }

    info!("[session {}] {:?} {} from offset {}", session.id, mode, path, restart);

    session.set_state(SessionState::DataConnect, CloseMask::DATA);
    session.file = Some(file);
    session.filesize = filesize;
    session.filepos = match mode {
        FileMode::Appe => filesize,
        FileMode::Retr | FileMode::Stor => restart,
    };
    session.bufferpos = 0;
    session.buffersize = 0;
    session.transferred = 0;

    let direction = match mode {
        FileMode::Retr => {
            session.flags.remove(SessionFlags::RECV);
            session.flags.insert(SessionFlags::SEND);
            Direction::Retrieve
        }
        FileMode::Stor | FileMode::Appe => {
            session.flags.remove(SessionFlags::SEND);
            session.flags.insert(SessionFlags::RECV);
            Direction::Store
        }
    };
    session.transfer = Transfer::File(direction);

    start_data_connection(session);
}

/// Prepares a LIST, MLSD, MLST, NLST or STAT listing.
///
/// MLST and STAT stream over the control connection and go straight to
/// DATA_TRANSFER; the others wait for a data connection.
pub fn xfer_dir(session: &mut Session, args: &str, mode: ListingMode, workaround: bool) {
    let path = match build_path(&session.cwd, args) {
        Ok(path) => path,
        Err(e) => {
            warn!("[session {}] bad path {:?}: {}", session.id, args, e);
            refuse(session, Reply::new(550, e.to_string()));
            return;
        }
    };

    let entry_type = match session.context.fs.entry_type(&path) {
        Ok(entry_type) => entry_type,
        Err(e) => {
            if workaround && mode == ListingMode::List {
                if let Some(stripped) = strip_list_flags(args) {
                    debug!("[session {}] retrying LIST without flags", session.id);
                    xfer_dir(session, stripped, mode, false);
                    return;
                }
            }
            warn!("[session {}] cannot list {}: {}", session.id, path, e);
            refuse(session, Reply::new(550, e.to_string()));
            return;
        }
    };

    // Drop any handle left over from an earlier transfer.
    session.set_state(SessionState::Command, CloseMask::empty());
    session.bufferpos = 0;
    session.buffersize = 0;
    session.transferred = 0;

    if entry_type == EntryType::File || mode == ListingMode::Mlst {
        if mode == ListingMode::Mlsd {
            refuse(session, Reply::new(501, "Invalid argument"));
            return;
        }

        let metadata = match session.context.fs.stat(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("[session {}] stat {}: {}", session.id, path, e);
                refuse(session, Reply::new(550, e.to_string()));
                return;
            }
        };

        let name = match mode {
            ListingMode::Mlst => encode_path(&path, true),
            ListingMode::Nlst => encode_path(&path, false),
            _ => encode_path(base_name(&path), false),
        };
        let line = listing::format_entry(
            mode,
            session.mlst_facts,
            &metadata,
            &name,
            session.context.clock.now(),
        );
        session.fill_buffer(&line);
    } else {
        let dir = match session.context.fs.open_dir(&path) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("[session {}] opendir {}: {}", session.id, path, e);
                refuse(session, Reply::new(550, e.to_string()));
                return;
            }
        };
        session.dir = Some(dir);
        session.lwd = path.clone();

        if mode == ListingMode::Mlsd && session.mlst_facts.contains(MlstFacts::TYPE) {
            match session.context.fs.stat(&path) {
                Ok(metadata) => {
                    let line = listing::format_cdir(
                        session.mlst_facts,
                        &metadata,
                        &encode_path(&path, false),
                    );
                    session.fill_buffer(&line);
                }
                Err(e) => debug!("[session {}] stat {}: {}", session.id, path, e),
            }
        }
    }

    match mode {
        ListingMode::Mlst | ListingMode::Stat => {
            session.set_state(SessionState::DataTransfer, CloseMask::PASV | CloseMask::DATA);
            session.data_over_control = true;
            session.flags.remove(SessionFlags::RECV);
            session.flags.insert(SessionFlags::SEND);
            session.transfer = Transfer::Listing(mode);
            let code = if mode == ListingMode::Mlst { 250 } else { 213 };
            session.send_response(Reply::open(code, "Status"));
        }
        _ => {
            if !session
                .flags
                .intersects(SessionFlags::PASV | SessionFlags::PORT)
            {
                warn!("[session {}] {:?} without PASV or PORT", session.id, mode);
                refuse(session, Reply::new(503, "Bad sequence of commands"));
                return;
            }
            info!("[session {}] {:?} {}", session.id, mode, path);
            session.set_state(SessionState::DataConnect, CloseMask::DATA);
            session.flags.remove(SessionFlags::RECV);
            session.flags.insert(SessionFlags::SEND);
            session.transfer = Transfer::Listing(mode);
            start_data_connection(session);
        }
    }
}

/// Dials out for PORT sessions; PASV sessions wait for the accept.
fn start_data_connection(session: &mut Session) {
    if session.flags.contains(SessionFlags::PASV) {
        return;
    }

    if let Err(e) = session.connect() {
        error!("[session {}] connect: {}", session.id, e);
        session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
        session.send_response(Reply::new(425, "can't open data connection"));
    }
}

/// Drops a leading `-a`/`-l` style flag token from a LIST argument.
fn strip_list_flags(args: &str) -> Option<&str> {
    if !(args.starts_with("-a") || args.starts_with("-l")) {
        return None;
    }
    match args.find(char::is_whitespace) {
        Some(space) => Some(args[space..].trim_start()),
        None => Some(""),
    }
}
