use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::*;
use crate::session::Session;
use std::collections::HashMap;

// Specific crates for PORT and PASV commands
use crate::core_network::pasv;
use crate::core_network::port;

/// A command handler receives the session and the raw argument text.
pub type CommandHandler = fn(&mut Session, &str);

pub type CommandTable = HashMap<FtpCommand, CommandHandler>;

pub fn initialize_command_handlers() -> CommandTable {
    let mut handlers: CommandTable = HashMap::new();

    handlers.insert(FtpCommand::ABOR, abor::handle_abor_command);
    handlers.insert(FtpCommand::ALLO, allo::handle_allo_command);
    handlers.insert(FtpCommand::APPE, appe::handle_appe_command);
    handlers.insert(FtpCommand::CDUP, cdup::handle_cdup_command);
    handlers.insert(FtpCommand::CWD, cwd::handle_cwd_command);
    handlers.insert(FtpCommand::DELE, dele::handle_dele_command);
    handlers.insert(FtpCommand::FEAT, feat::handle_feat_command);
    handlers.insert(FtpCommand::HELP, help::handle_help_command);
    handlers.insert(FtpCommand::LIST, list::handle_list_command);
    handlers.insert(FtpCommand::MDTM, mdtm::handle_mdtm_command);
    handlers.insert(FtpCommand::MKD, mkd::handle_mkd_command);
    handlers.insert(FtpCommand::MLSD, mlsd::handle_mlsd_command);
    handlers.insert(FtpCommand::MLST, mlst::handle_mlst_command);
    handlers.insert(FtpCommand::MODE, mode::handle_mode_command);
    handlers.insert(FtpCommand::NLST, nlst::handle_nlst_command);
    handlers.insert(FtpCommand::NOOP, noop::handle_noop_command);
    handlers.insert(FtpCommand::OPTS, opts::handle_opts_command);
    handlers.insert(FtpCommand::PASS, pass::handle_pass_command);
    handlers.insert(FtpCommand::PASV, pasv::handle_pasv_command);
    handlers.insert(FtpCommand::PORT, port::handle_port_command);
    handlers.insert(FtpCommand::PWD, pwd::handle_pwd_command);
    handlers.insert(FtpCommand::QUIT, quit::handle_quit_command);
    handlers.insert(FtpCommand::REST, rest::handle_rest_command);
    handlers.insert(FtpCommand::RETR, retr::handle_retr_command);
    handlers.insert(FtpCommand::RMD, rmd::handle_rmd_command);
    handlers.insert(FtpCommand::RNFR, rnfr::handle_rnfr_command);
    handlers.insert(FtpCommand::RNTO, rnto::handle_rnto_command);
    handlers.insert(FtpCommand::SIZE, size::handle_size_command);
    handlers.insert(FtpCommand::STAT, stat::handle_stat_command);
    handlers.insert(FtpCommand::STOR, stor::handle_stor_command);
    handlers.insert(FtpCommand::STOU, stou::handle_stou_command);
    handlers.insert(FtpCommand::STRU, stru::handle_stru_command);
    handlers.insert(FtpCommand::SYST, syst::handle_syst_command);
    handlers.insert(FtpCommand::TYPE, type_::handle_type_command);
    handlers.insert(FtpCommand::USER, user::handle_user_command);

    // Legacy aliases share their modern handlers
    handlers.insert(FtpCommand::XCUP, cdup::handle_cdup_command);
    handlers.insert(FtpCommand::XCWD, cwd::handle_cwd_command);
    handlers.insert(FtpCommand::XMKD, mkd::handle_mkd_command);
    handlers.insert(FtpCommand::XPWD, pwd::handle_pwd_command);
    handlers.insert(FtpCommand::XRMD, rmd::handle_rmd_command);

    handlers
}
