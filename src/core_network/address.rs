use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;
use thiserror::Error;

/// An IPv4 endpoint in the RFC 959 `h1,h2,h3,h4,p1,p2` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpAddress(pub SocketAddrV4);

impl From<SocketAddrV4> for FtpAddress {
    fn from(addr: SocketAddrV4) -> Self {
        FtpAddress(addr)
    }
}

impl fmt::Display for FtpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h1, h2, h3, h4] = self.0.ip().octets();
        let [p1, p2] = self.0.port().to_be_bytes();
        write!(f, "{},{},{},{},{},{}", h1, h2, h3, h4, p1, p2)
    }
}

/// Why a PORT argument could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid field {0:?}")]
    InvalidField(String),
}

impl FromStr for FtpAddress {
    type Err = AddressError;

    /// Parses exactly six comma (or dot) separated decimal bytes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(|c: char| c == ',' || c == '.').collect();
        if parts.len() != 6 {
            return Err(AddressError::FieldCount(parts.len()));
        }

        let mut fields = [0u8; 6];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AddressError::InvalidField(part.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| AddressError::InvalidField(part.to_string()))?;
        }

        let ip = Ipv4Addr::new(fields[0], fields[1], fields[2], fields[3]);
        let port = u16::from_be_bytes([fields[4], fields[5]]);
        Ok(FtpAddress(SocketAddrV4::new(ip, port)))
    }
}
