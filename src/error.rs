use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("sentence is not framed by '$' and '*'")]
    Framing,

    #[error("checksum mismatch: expected {expected:02X}, got {found:02X}")]
    Checksum { expected: u8, found: u8 },

    #[error("invalid checksum digits")]
    ChecksumDigits,

    #[error("invalid {0} field")]
    InvalidField(&'static str),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[cfg(feature = "upload")]
    #[error("provisioning failure: {0}")]
    Provisioning(String),
}
