use log::debug;

mod interface;

use interface::Interface;

use std::{
    fs::File,
    io::{ErrorKind, Read},
    time::Duration,
};

use crate::{aggregator::Batch, error::Error, fix::FixStatus, nmea::Decoder};

pub struct Device {
    pub interface: Interface,
    decoder: Decoder,
}

impl Device {
    fn new(interface: Interface) -> Self {
        Self {
            interface,
            decoder: Decoder::new(),
        }
    }

    /// Opens a capture file, gzip compressed if terminated by ".gz"
    pub fn open_file(fullpath: &str) -> Result<Self, Error> {
        let handle = File::open(fullpath)?;

        let interface = if fullpath.ends_with(".gz") {
            Interface::from_gzip_file_handle(handle)
        } else {
            Interface::from_file_handle(handle)
        };

        Ok(Self::new(interface))
    }

    /// Appends a capture file, replayed once previous content has been consumed
    pub fn stack_file(&mut self, fullpath: &str) -> Result<(), Error> {
        let handle = File::open(fullpath)?;

        if fullpath.ends_with(".gz") {
            self.interface.stack_gzip_file_handle(handle);
        } else {
            self.interface.stack_file_handle(handle);
        }

        Ok(())
    }

    pub fn open_serial_port(port_str: &str, baud: u32) -> Result<Self, Error> {
        let port = serialport::new(port_str, baud)
            .timeout(Duration::from_millis(250))
            .open()?;

        debug!("{} opened at {} bauds", port_str, baud);

        Ok(Self::new(Interface::from_serial_port(port)))
    }

    /// Latest [FixStatus] decoded from the stream
    pub fn fix(&self) -> &FixStatus {
        self.decoder.fix()
    }

    /// Consume all pending NMEA sentences, without blocking.
    /// `cb` is invoked for each visibility sentence.
    /// In passive mode, a single buffer is consumed per call.
    ///
    /// ## Returns
    /// - Ok(0) once all content was consumed (no byte present),
    ///   which means end of input in passive mode.
    /// - Ok(n) with n=number of bytes that were consumed
    /// - Err(e) on I/O error
    pub fn consume_all_cb<T: FnMut(&Batch)>(
        &mut self,
        buffer: &mut [u8],
        mut cb: T,
    ) -> std::io::Result<usize> {
        let mut total = 0;

        loop {
            let nbytes = self.read_interface(buffer)?;
            if nbytes == 0 {
                return Ok(total);
            }

            self.decoder.consume(&buffer[..nbytes], &mut cb);
            total += nbytes;

            if self.interface.is_read_only() {
                return Ok(total);
            }
        }
    }

    /// Reads internal [Interface], converting timeouts into "No Data Received",
    /// which is most convenient for real-time perpertual hardware application like this one.
    fn read_interface(&mut self, output: &mut [u8]) -> std::io::Result<usize> {
        match self.interface.read(output) {
            Ok(b) => Ok(b),
            Err(e) => {
                if e.kind() == ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            },
        }
    }
}
