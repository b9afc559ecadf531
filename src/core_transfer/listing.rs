use crate::core_fs::{EntryType, Metadata};
use crate::core_ftpcommand::reply::Reply;
use crate::core_transfer::LoopStatus;
use crate::helpers::{build_path, encode_path};
use crate::session::{CloseMask, Session, SessionState};
use bitflags::bitflags;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use std::io;

bitflags! {
    /// Facts reported by MLST and MLSD, selected with `OPTS MLST`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MlstFacts: u8 {
        const TYPE = 1 << 0;
        const SIZE = 1 << 1;
        const MODIFY = 1 << 2;
        const PERM = 1 << 3;
        const UNIX_MODE = 1 << 4;
    }
}

const FACT_NAMES: [(MlstFacts, &str); 5] = [
    (MlstFacts::TYPE, "Type"),
    (MlstFacts::SIZE, "Size"),
    (MlstFacts::MODIFY, "Modify"),
    (MlstFacts::PERM, "Perm"),
    (MlstFacts::UNIX_MODE, "UNIX.mode"),
];

impl Default for MlstFacts {
    fn default() -> Self {
        MlstFacts::TYPE | MlstFacts::SIZE | MlstFacts::MODIFY | MlstFacts::PERM
    }
}

impl MlstFacts {
    /// Parses an `OPTS MLST` fact list such as `Type;Size;`.
    ///
    /// Names match case-insensitively and unknown facts are ignored.
    pub fn parse(list: &str) -> MlstFacts {
        list.split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                FACT_NAMES
                    .iter()
                    .find(|(_, known)| known.eq_ignore_ascii_case(name))
                    .map(|(fact, _)| *fact)
            })
            .fold(MlstFacts::empty(), |facts, fact| facts | fact)
    }

    /// The enabled facts as `Type;Size;`.
    pub fn describe(&self) -> String {
        FACT_NAMES
            .iter()
            .filter(|(fact, _)| self.contains(*fact))
            .map(|(_, name)| format!("{};", name))
            .collect()
    }

    /// Every supported fact, with `*` after the enabled ones, for FEAT.
    pub fn feat_line(&self) -> String {
        FACT_NAMES
            .iter()
            .map(|(fact, name)| {
                if self.contains(*fact) {
                    format!("{}*;", name)
                } else {
                    format!("{};", name)
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    List,
    Mlsd,
    Mlst,
    Nlst,
    Stat,
}

fn permissions(metadata: &Metadata) -> String {
    let bits = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    let kind = match metadata.entry_type {
        EntryType::Directory => 'd',
        EntryType::File => '-',
    };
    std::iter::once(kind)
        .chain(
            bits.iter()
                .map(|&(bit, c)| if metadata.mode & bit != 0 { c } else { '-' }),
        )
        .collect()
}

fn perm_letters(metadata: &Metadata) -> String {
    let readable = metadata.mode & 0o400 != 0;
    let writable = metadata.mode & 0o200 != 0;
    let executable = metadata.mode & 0o100 != 0;

    let mut perm = String::new();
    match metadata.entry_type {
        EntryType::File => {
            if writable {
                perm.push_str("adfw");
            }
            if readable {
                perm.push('r');
            }
        }
        EntryType::Directory => {
            if writable {
                perm.push_str("cdmpf");
            }
            if executable {
                perm.push('e');
            }
            if readable {
                perm.push('l');
            }
        }
    }
    perm
}

fn facts(facts: MlstFacts, metadata: &Metadata, type_name: &str) -> String {
    let mut out = String::new();
    if facts.contains(MlstFacts::TYPE) {
        out.push_str(&format!("type={};", type_name));
    }
    if facts.contains(MlstFacts::SIZE) {
        out.push_str(&format!("size={};", metadata.size));
    }
    if facts.contains(MlstFacts::MODIFY) {
        out.push_str(&format!("modify={};", metadata.modified.format("%Y%m%d%H%M%S")));
    }
    if facts.contains(MlstFacts::PERM) {
        out.push_str(&format!("perm={};", perm_letters(metadata)));
    }
    if facts.contains(MlstFacts::UNIX_MODE) {
        out.push_str(&format!("UNIX.mode=0{:o};", metadata.mode & 0o7777));
    }
    out
}

fn list_line(metadata: &Metadata, name: &str, now: DateTime<Utc>) -> String {
    // Older than roughly six months shows the year instead of the time.
    let recent = (now - metadata.modified).num_seconds().abs() < Duration::days(183).num_seconds();
    let date = if recent {
        metadata.modified.format("%b %d %H:%M")
    } else {
        metadata.modified.format("%b %d  %Y")
    };
    format!(
        "{} 1 ftp ftp {} {} {}",
        permissions(metadata),
        metadata.size,
        date,
        name
    )
}

/// Formats one listing record, without the line terminator.
///
/// `name` must already be encoded for the wire.
pub fn format_entry(
    mode: ListingMode,
    mlst_facts: MlstFacts,
    metadata: &Metadata,
    name: &str,
    now: DateTime<Utc>,
) -> String {
    let type_name = match metadata.entry_type {
        EntryType::Directory => "dir",
        EntryType::File => "file",
    };
    match mode {
        ListingMode::List => list_line(metadata, name, now),
        ListingMode::Stat => format!(" {}", list_line(metadata, name, now)),
        ListingMode::Mlsd => format!("{} {}", facts(mlst_facts, metadata, type_name), name),
        ListingMode::Mlst => format!(" {} {}", facts(mlst_facts, metadata, type_name), name),
        ListingMode::Nlst => name.to_string(),
    }
}

/// The `type=cdir` record MLSD sends for the listed directory itself.
pub fn format_cdir(mlst_facts: MlstFacts, metadata: &Metadata, name: &str) -> String {
    format!("{} {}", facts(mlst_facts, metadata, "cdir"), name)
}

fn finish(session: &mut Session, mode: ListingMode) {
    let reply = match mode {
        ListingMode::Mlst => Reply::new(250, "End"),
        ListingMode::Stat => Reply::new(213, "OK"),
        _ => Reply::new(226, "OK"),
    };
    info!("[session {}] {:?} complete", session.id, mode);
    session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
    session.send_response(reply);
}

/// Sends buffered listing bytes, refilling the buffer one entry at a time.
pub fn list_transfer(session: &mut Session, mode: ListingMode) -> LoopStatus {
    if session.bufferpos < session.buffersize {
        let pending = session.bufferpos..session.buffersize;
        match session.data_write(&session.buffer[pending]) {
            Ok(0) => {
                warn!("[session {}] peer closed during listing", session.id);
                session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                session.send_response(Reply::new(426, "Connection broken during transfer"));
                LoopStatus::Exit
            }
            Ok(sent) => {
                session.bufferpos += sent;
                LoopStatus::Continue
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => LoopStatus::Exit,
            Err(e) => {
                error!("[session {}] send: {}", session.id, e);
                session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                session.send_response(Reply::new(426, "Connection broken during transfer"));
                LoopStatus::Exit
            }
        }
    } else {
        session.bufferpos = 0;
        session.buffersize = 0;
        next_entry(session, mode)
    }
}

fn next_entry(session: &mut Session, mode: ListingMode) -> LoopStatus {
    let next = match session.dir.as_mut() {
        Some(dir) => dir.next_entry(),
        None => None,
    };

    let name = match next {
        None => {
            finish(session, mode);
            return LoopStatus::Exit;
        }
        Some(Err(e)) => {
            error!("[session {}] readdir: {}", session.id, e);
            session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
            session.send_response(Reply::new(450, e.to_string()));
            return LoopStatus::Exit;
        }
        Some(Ok(name)) => name,
    };

    let path = match build_path(&session.lwd, &name) {
        Ok(path) => path,
        Err(e) => {
            // Names the path builder refuses cannot be addressed by clients either.
            debug!("[session {}] skipping {:?}: {}", session.id, name, e);
            return LoopStatus::Continue;
        }
    };

    let line = if mode == ListingMode::Nlst {
        encode_path(&path, false)
    } else {
        let metadata = match session.context.fs.lstat(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("[session {}] stat {}: {}", session.id, path, e);
                session.set_state(SessionState::Command, CloseMask::PASV | CloseMask::DATA);
                session.send_response(Reply::new(550, "unavailable"));
                return LoopStatus::Exit;
            }
        };
        format_entry(
            mode,
            session.mlst_facts,
            &metadata,
            &encode_path(&name, false),
            session.context.clock.now(),
        )
    };

    session.fill_buffer(&line);
    LoopStatus::Continue
}
