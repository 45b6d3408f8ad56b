use flate2::read::GzDecoder;
use log::error;
use serialport::SerialPort;
use std::fs::File;
use std::io::{Read, empty};

/// [Interface] to the NMEA stream
pub enum Interface {
    /// [Interface::ReadOnly] is dedicated to read only input, mainly File inputs.
    ReadOnly(Box<dyn Read>),

    /// [Interface::Port] is used to connect to a physical port,
    /// streaming from a GNSS module.
    Port(Box<dyn SerialPort>),
}

impl Interface {
    /// Creates a new [SerialPort] interface
    pub fn from_serial_port(port: Box<dyn SerialPort>) -> Self {
        Self::Port(port)
    }

    /// Creates a new Read-Only interface
    pub fn from_file_handle(handle: File) -> Self {
        Self::ReadOnly(Box::new(handle))
    }

    /// Creates a new Read-Only interface, from gzip compressed content
    pub fn from_gzip_file_handle(handle: File) -> Self {
        Self::ReadOnly(Box::new(GzDecoder::new(handle)))
    }

    /// Appends a file to this Read-Only interface,
    /// consumed once all previous content has been consumed.
    pub fn stack_file_handle(&mut self, handle: File) {
        self.stack(handle);
    }

    /// Appends gzip compressed content to this Read-Only interface
    pub fn stack_gzip_file_handle(&mut self, handle: File) {
        self.stack(GzDecoder::new(handle));
    }

    fn stack<R: Read + 'static>(&mut self, next: R) {
        match self {
            Self::ReadOnly(r) => {
                let prev = std::mem::replace(r, Box::new(empty()));
                *r = Box::new(prev.chain(next));
            },
            Self::Port(_) => {
                error!("cannot stack file content on top of a serial port");
            },
        }
    }

    /// True if this is a passive [Interface]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }
}

impl std::io::Read for Interface {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::ReadOnly(r) => r.read(buf),
            Self::Port(port) => {
                // only what is already buffered
                let available = port.bytes_to_read()? as usize;
                if available == 0 {
                    return Ok(0);
                }
                let size = available.min(buf.len());
                port.read(&mut buf[..size])
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::Interface;
    use std::io::{Cursor, Read};

    #[test]
    fn stacked_content() {
        let mut interface = Interface::ReadOnly(Box::new(Cursor::new(b"first\n".to_vec())));
        interface.stack(Cursor::new(b"second\n".to_vec()));

        assert!(interface.is_read_only());

        let mut content = String::new();
        interface.read_to_string(&mut content).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
