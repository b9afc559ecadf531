pub mod address;
pub mod network;
pub mod pasv;
pub mod port;
pub mod socket;

pub use address::FtpAddress;
