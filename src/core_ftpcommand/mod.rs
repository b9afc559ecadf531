// Here's the list of the FTP commands implemented
pub mod abor;
pub mod allo;
pub mod appe;
pub mod cdup;
pub mod cwd;
pub mod dele;
pub mod feat;
pub mod help;
pub mod list;
pub mod mdtm;
pub mod mkd;
pub mod mlsd;
pub mod mlst;
pub mod mode;
pub mod nlst;
pub mod noop;
pub mod opts;
pub mod pass;
pub mod pwd;
pub mod quit;
pub mod rest;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod rnto;
pub mod size;
pub mod stat;
pub mod stor;
pub mod stou;
pub mod stru;
pub mod syst;
pub mod type_;
pub mod user;

// Dispatch table, verbs and reply formatting
pub mod ftpcommand;
pub mod handlers;
pub mod reply;
