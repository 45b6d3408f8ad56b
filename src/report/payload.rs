use std::io::Write;

use log::error;
use serde::Serialize;

use crate::{report::Sink, snapshot::Snapshot};

/// One visible satellite
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisibleSat {
    pub prn: u8,
    pub elev: u16,
    pub azim: u16,
    pub snr: u16,
}

/// JSON telemetry document of a [Snapshot]
#[derive(Debug, Clone, Serialize)]
pub struct Payload<'a> {
    /// ISO-8601 UTC timestamp, null when date or time is unknown
    pub timestamp: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub sats: u32,
    pub hdop: f64,
    pub session_id: &'a str,
    pub visible_sats: Vec<VisibleSat>,
}

impl<'a> From<&'a Snapshot> for Payload<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        let fix = &snapshot.fix;

        Self {
            timestamp: fix.timestamp(),
            latitude: fix.location.value.latitude,
            longitude: fix.location.value.longitude,
            sats: fix.satellites.value,
            hdop: fix.hdop.value,
            session_id: snapshot.session.as_str(),
            visible_sats: snapshot
                .satellites
                .iter()
                .map(|sat| VisibleSat {
                    prn: sat.prn,
                    elev: sat.elevation,
                    azim: sat.azimuth,
                    snr: sat.snr,
                })
                .collect(),
        }
    }
}

impl Payload<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One JSON [Payload] per line, in place of the text table
pub struct JsonLines<W: Write> {
    w: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    fn release(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.w, &Payload::from(snapshot))?;
        writeln!(self.w)?;
        self.w.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> Sink for JsonLines<W> {
    fn consume(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.release(snapshot) {
            error!("#{} - json output error: {}", snapshot.sequence, e);
        }
    }
}
