use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use hifitime::prelude::Duration;

use crate::{
    error::Error,
    report::display::DisplayGeometry,
    settings::{MIN_INTERVAL_MS, Settings},
};

#[cfg(feature = "upload")]
use crate::settings::UploadSettings;

/// Default receiver data rate
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: Self::command().get_matches(),
        }
    }

    fn command() -> Command {
        let command = Command::new("gnss-logger")
            .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
            .version(env!("CARGO_PKG_VERSION"))
            .about("NMEA stream to console table, character display and JSON telemetry")
            .color(ColorChoice::Always)
            .arg_required_else_help(true)
            .next_help_heading("Serial port (Active device, GNSS module)")
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .required_unless_present_any(["file"])
                    .help("Define serial port. Example /dev/ttyUSB0 on Linux"),
            )
            .arg(
                Arg::new("baudrate")
                    .short('b')
                    .long("baud")
                    .required(false)
                    .value_name("Baudrate (u32)")
                    .help("Define serial port baud rate. Communications will not work if your receiver streams at a different data-rate. By default we use 9600"),
            )
            .next_help_heading("File interface (Passive mode)")
            .arg(
                Arg::new("file")
                    .long("file")
                    .short('f')
                    .value_name("FILENAME")
                    .action(ArgAction::Append)
                    .required_unless_present_any(["port"])
                    .help("Replay a NMEA capture. Use as many as needed.
Each file is consumed one after the other. Gzip files are supported but they must be terminated with '.gz'"),
            )
            .next_help_heading("Reporting")
            .arg(
                Arg::new("interval")
                    .short('i')
                    .long("interval")
                    .value_name("DURATION")
                    .required(false)
                    .help("Define reporting interval. Default value is 2 s, minimum is 100 ms."),
            )
            .arg(
                Arg::new("require-fix")
                    .long("require-fix")
                    .action(ArgAction::SetTrue)
                    .help("Only report once a location has been resolved.
Satellites keep accumulating until then."),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Report on stdout as JSON lines (one telemetry document per report),
rather than the text table."),
            )
            .arg(
                Arg::new("hwid")
                    .long("hwid")
                    .value_name("ID")
                    .required(false)
                    .help("Define hardware identifier, used in the session identifier.
Defaults to the serial port name."),
            )
            .arg(
                Arg::new("lcd-cols")
                    .long("lcd-cols")
                    .value_name("COLUMNS")
                    .required(false)
                    .help("Define number of columns of the character display. Default is 16."),
            );

        #[cfg(feature = "upload")]
        let command = command
            .next_help_heading("Remote telemetry")
            .arg(
                Arg::new("url")
                    .long("url")
                    .value_name("URL")
                    .required(false)
                    .help("Upload every report to this endpoint (HTTP POST, JSON)."),
            )
            .arg(
                Arg::new("timeout")
                    .long("timeout")
                    .value_name("DURATION")
                    .required(false)
                    .requires("url")
                    .help("Define upload timeout. Default value is 5 s."),
            );

        command
    }

    /// Returns User serial port specification
    pub fn serial_port(&self) -> Option<&String> {
        self.matches.get_one::<String>("port")
    }

    /// Input file paths
    pub fn filepaths(&self) -> Vec<&String> {
        if let Some(fp) = self.matches.get_many::<String>("file") {
            fp.collect()
        } else {
            Vec::new()
        }
    }

    /// Returns User baud rate specification
    pub fn baud_rate(&self) -> Result<u32, Error> {
        match self.matches.get_one::<String>("baudrate") {
            Some(baud) => baud
                .trim()
                .parse::<u32>()
                .map_err(|e| Error::InvalidValue("baud rate", e.to_string())),
            None => Ok(DEFAULT_BAUD_RATE),
        }
    }

    fn duration(&self, key: &str) -> Result<Option<Duration>, Error> {
        match self.matches.get_one::<String>(key) {
            Some(value) => {
                let dt = value
                    .trim()
                    .parse::<Duration>()
                    .map_err(|e| Error::InvalidDuration(format!("\"{}\": {}", value, e)))?;
                Ok(Some(dt))
            },
            None => Ok(None),
        }
    }

    fn interval(&self) -> Result<Duration, Error> {
        let dt = self
            .duration("interval")?
            .unwrap_or(Duration::from_milliseconds(2000.0));

        if dt < Duration::from_milliseconds(MIN_INTERVAL_MS) {
            return Err(Error::InvalidDuration(format!(
                "reporting interval is limited to {} ms",
                MIN_INTERVAL_MS
            )));
        }

        Ok(dt)
    }

    fn hardware_id(&self) -> String {
        if let Some(hwid) = self.matches.get_one::<String>("hwid") {
            return hwid.to_string();
        }

        match self.serial_port() {
            Some(port) => port
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(port)
                .to_string(),
            None => "replay".to_string(),
        }
    }

    fn display(&self) -> Result<DisplayGeometry, Error> {
        let mut geometry = DisplayGeometry::default();

        if let Some(cols) = self.matches.get_one::<String>("lcd-cols") {
            geometry.cols = cols
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::InvalidValue("display columns", e.to_string()))?;
        }

        Ok(geometry)
    }

    #[cfg(feature = "upload")]
    fn upload(&self) -> Result<Option<UploadSettings>, Error> {
        let url = match self.matches.get_one::<String>("url") {
            Some(url) => url.to_string(),
            None => return Ok(None),
        };

        let timeout = self
            .duration("timeout")?
            .unwrap_or(Duration::from_seconds(5.0));

        let nanos = timeout.total_nanoseconds().max(0) as u64;

        Ok(Some(UploadSettings {
            url,
            timeout: std::time::Duration::from_nanos(nanos),
        }))
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        Ok(Settings {
            interval: self.interval()?,
            require_fix: self.matches.get_flag("require-fix"),
            display: self.display()?,
            hardware_id: self.hardware_id(),
            json: self.matches.get_flag("json"),
            #[cfg(feature = "upload")]
            upload: self.upload()?,
        })
    }
}
