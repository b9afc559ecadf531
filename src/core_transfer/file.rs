use crate::constants::RETR_CHUNK_SIZE;
use crate::core_ftpcommand::reply::Reply;
use crate::core_transfer::LoopStatus;
use crate::session::{CloseMask, Session, SessionState};
use log::{error, info, warn};
use std::io;

fn abort_transfer(session: &mut Session, reply: Reply) -> LoopStatus {
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.send_response(reply);
    LoopStatus::Exit
}

fn broken(session: &mut Session, e: Option<io::Error>) -> LoopStatus {
    match e {
        Some(e) => error!("[session {}] data connection: {}", session.id, e),
        None => warn!("[session {}] peer closed data connection", session.id),
    }
    abort_transfer(session, Reply::new(426, "Connection broken during transfer"))
}

/// Sends the file to the client, one chunk at a time.
///
/// Refills the transfer buffer from `filepos` once the previous chunk has
/// been fully sent. End of file completes the transfer with 226.
pub fn retrieve_transfer(session: &mut Session) -> LoopStatus {
    if session.bufferpos == session.buffersize {
        let read = match session.file.as_mut() {
            Some(file) => file.read(session.filepos, &mut session.buffer[..RETR_CHUNK_SIZE]),
            None => return abort_transfer(session, Reply::new(451, "Failed to read file")),
        };

        match read {
            Ok(0) => {
                info!("[session {}] sent {} bytes", session.id, session.transferred);
                return abort_transfer(session, Reply::new(226, "OK"));
            }
            Ok(n) => {
                session.bufferpos = 0;
                session.buffersize = n;
            }
            Err(e) => {
                error!("[session {}] read: {}", session.id, e);
                return abort_transfer(session, Reply::new(451, "Failed to read file"));
            }
        }
    }

    let pending = session.bufferpos..session.buffersize;
    match session.data_write(&session.buffer[pending]) {
        Ok(0) => broken(session, None),
        Ok(sent) => {
            session.bufferpos += sent;
            session.filepos += sent as u64;
            session.transferred += sent as u64;
            LoopStatus::Continue
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => LoopStatus::Exit,
        Err(e) => broken(session, Some(e)),
    }
}

/// Writes bytes received on the data connection into the file.
///
/// A clean end of stream from the client completes the transfer with 226.
pub fn store_transfer(session: &mut Session) -> LoopStatus {
    if session.bufferpos == session.buffersize {
        match session.data_read() {
            Ok(0) => {
                info!("[session {}] stored {} bytes", session.id, session.transferred);
                abort_transfer(session, Reply::new(226, "OK"));
                session.log_free_space();
                return LoopStatus::Exit;
            }
            Ok(n) => {
                session.bufferpos = 0;
                session.buffersize = n;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return LoopStatus::Exit,
            Err(e) => return broken(session, Some(e)),
        }
    }

    let written = match session.file.as_mut() {
        Some(file) => file.write(
            session.filepos,
            &session.buffer[session.bufferpos..session.buffersize],
        ),
        None => return abort_transfer(session, Reply::new(451, "Failed to write file")),
    };

    match written {
        Ok(0) => abort_transfer(session, Reply::new(451, "Failed to write file")),
        Ok(n) => {
            session.bufferpos += n;
            session.filepos += n as u64;
            session.transferred += n as u64;
            session.filesize = session.filesize.max(session.filepos);
            LoopStatus::Continue
        }
        Err(e) => {
            error!("[session {}] write: {}", session.id, e);
            abort_transfer(session, Reply::new(451, "Failed to write file"))
        }
    }
}
