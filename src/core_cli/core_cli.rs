use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pollftpd", about = "A poll-driven FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory served as the FTP root, overrides the configuration
    #[arg(short, long)]
    pub root: Option<String>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
