#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum FtpCommand {
    ABOR,
    ALLO,
    APPE,
    CDUP,
    CWD,
    DELE,
    FEAT,
    HELP,
    LIST,
    MDTM,
    MKD,
    MLSD,
    MLST,
    MODE,
    NLST,
    NOOP,
    OPTS,
    PASS,
    PASV,
    PORT,
    PWD,
    QUIT,
    REST,
    RETR,
    RMD,
    RNFR,
    RNTO,
    SIZE,
    STAT,
    STOR,
    STOU,
    STRU,
    SYST,
    TYPE,
    USER,
    // Legacy RFC 775 aliases
    XCUP,
    XCWD,
    XMKD,
    XPWD,
    XRMD,
}

impl FtpCommand {
    /// Case-insensitive lookup of a command verb.
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "ABOR" => Some(FtpCommand::ABOR),
            "ALLO" => Some(FtpCommand::ALLO),
            "APPE" => Some(FtpCommand::APPE),
            "CDUP" => Some(FtpCommand::CDUP),
            "CWD" => Some(FtpCommand::CWD),
            "DELE" => Some(FtpCommand::DELE),
            "FEAT" => Some(FtpCommand::FEAT),
            "HELP" => Some(FtpCommand::HELP),
            "LIST" => Some(FtpCommand::LIST),
            "MDTM" => Some(FtpCommand::MDTM),
            "MKD" => Some(FtpCommand::MKD),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "MODE" => Some(FtpCommand::MODE),
            "NLST" => Some(FtpCommand::NLST),
            "NOOP" => Some(FtpCommand::NOOP),
            "OPTS" => Some(FtpCommand::OPTS),
            "PASS" => Some(FtpCommand::PASS),
            "PASV" => Some(FtpCommand::PASV),
            "PORT" => Some(FtpCommand::PORT),
            "PWD" => Some(FtpCommand::PWD),
            "QUIT" => Some(FtpCommand::QUIT),
            "REST" => Some(FtpCommand::REST),
            "RETR" => Some(FtpCommand::RETR),
            "RMD" => Some(FtpCommand::RMD),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "SIZE" => Some(FtpCommand::SIZE),
            "STAT" => Some(FtpCommand::STAT),
            "STOR" => Some(FtpCommand::STOR),
            "STOU" => Some(FtpCommand::STOU),
            "STRU" => Some(FtpCommand::STRU),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            "USER" => Some(FtpCommand::USER),
            "XCUP" => Some(FtpCommand::XCUP),
            "XCWD" => Some(FtpCommand::XCWD),
            "XMKD" => Some(FtpCommand::XMKD),
            "XPWD" => Some(FtpCommand::XPWD),
            "XRMD" => Some(FtpCommand::XRMD),
            _ => None,
        }
    }

    /// Commands still accepted while a data connection is pending or active.
    pub fn allowed_during_transfer(&self) -> bool {
        matches!(self, FtpCommand::ABOR | FtpCommand::STAT | FtpCommand::QUIT)
    }
}
