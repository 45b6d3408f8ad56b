//! NMEA-0183 sentence decoder.
//!
//! Frames the receiver byte stream into sentences, verifies their checksum
//! and maintains the [FixStatus] from GGA and RMC sentences.
//! GPS visibility sentences (GPGSV) are handed over as [Batch]es.
//! Every other sentence is ignored.
use itertools::Itertools;
use log::{debug, trace};

use crate::{
    aggregator::{Batch, MAX_TUPLES, SatTuple},
    error::Error,
    fix::{Date, Field, FixStatus, Location, Time},
};

/// Longest sentence we buffer, '$' and checksum included
pub const MAX_LINE: usize = 120;

#[derive(Debug, Default)]
pub struct Decoder {
    /// Pending sentence
    line: Vec<u8>,

    /// Pending sentence exceeded [MAX_LINE]
    overflow: bool,

    /// Latest fix status
    fix: FixStatus,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            line: Vec::with_capacity(MAX_LINE),
            ..Default::default()
        }
    }

    /// Latest [FixStatus]
    pub fn fix(&self) -> &FixStatus {
        &self.fix
    }

    /// Consumes a chunk of the byte stream.
    /// `cb` is invoked for each decoded visibility sentence.
    /// Returns the number of sentences that passed verification.
    pub fn consume<F: FnMut(&Batch)>(&mut self, bytes: &[u8], mut cb: F) -> usize {
        let mut total = 0;

        for &byte in bytes {
            match byte {
                b'$' => {
                    if !self.line.is_empty() {
                        trace!("unterminated sentence dropped");
                    }
                    self.line.clear();
                    self.overflow = false;
                    self.line.push(b'$');
                },
                b'\r' => {},
                b'\n' => {
                    if self.overflow {
                        debug!("sentence exceeding {} bytes dropped", MAX_LINE);
                    } else if !self.line.is_empty() && self.process(&mut cb) {
                        total += 1;
                    }
                    self.line.clear();
                    self.overflow = false;
                },
                _ => {
                    if self.line.is_empty() {
                        // noise in between sentences
                        continue;
                    }
                    if self.line.len() < MAX_LINE {
                        self.line.push(byte);
                    } else {
                        self.overflow = true;
                    }
                },
            }
        }

        total
    }

    /// Decodes the pending sentence
    fn process<F: FnMut(&Batch)>(&mut self, cb: &mut F) -> bool {
        let line = std::mem::take(&mut self.line);

        let decoded = match std::str::from_utf8(&line) {
            Ok(text) => match self.decode(text, cb) {
                Ok(_) => true,
                Err(e) => {
                    trace!("\"{}\": {}", text, e);
                    false
                },
            },
            Err(e) => {
                trace!("invalid sentence: {}", e);
                false
            },
        };

        self.line = line;
        decoded
    }

    fn decode<F: FnMut(&Batch)>(&mut self, text: &str, cb: &mut F) -> Result<(), Error> {
        let body = verify(text)?;

        let mut fields = body.split(',');

        let talker = fields.next().unwrap_or_default();

        match talker.get(2..) {
            Some("GGA") => self.decode_gga(&mut fields),
            Some("RMC") => self.decode_rmc(&mut fields),
            Some("GSV") if talker.starts_with("GP") => {
                let batch = decode_gsv(&mut fields)?;
                cb(&batch);
                Ok(())
            },
            _ => Ok(()),
        }
    }

    fn decode_gga<'a, I: Iterator<Item = &'a str>>(&mut self, fields: &mut I) -> Result<(), Error> {
        let time = fields.next().ok_or(Error::InvalidField("time"))?;
        let latitude = fields.next().ok_or(Error::InvalidField("latitude"))?;
        let north_south = fields.next().ok_or(Error::InvalidField("latitude"))?;
        let longitude = fields.next().ok_or(Error::InvalidField("longitude"))?;
        let east_west = fields.next().ok_or(Error::InvalidField("longitude"))?;
        let quality = fields.next().ok_or(Error::InvalidField("quality"))?;
        let satellites = fields.next().ok_or(Error::InvalidField("satellites"))?;
        let hdop = fields.next().ok_or(Error::InvalidField("hdop"))?;

        update(&mut self.fix.time, parse_time(time));

        let resolved = quality.trim().parse::<u8>().unwrap_or(0) > 0;

        let location = if resolved {
            parse_location(latitude, north_south, longitude, east_west)
        } else {
            None
        };

        update(&mut self.fix.location, location);
        update(&mut self.fix.satellites, satellites.trim().parse::<u32>().ok());
        update(
            &mut self.fix.hdop,
            hdop.trim()
                .parse::<f64>()
                .ok()
                .filter(|hdop| hdop.is_finite()),
        );

        Ok(())
    }

    fn decode_rmc<'a, I: Iterator<Item = &'a str>>(&mut self, fields: &mut I) -> Result<(), Error> {
        let time = fields.next().ok_or(Error::InvalidField("time"))?;
        let status = fields.next().ok_or(Error::InvalidField("status"))?;
        let latitude = fields.next().ok_or(Error::InvalidField("latitude"))?;
        let north_south = fields.next().ok_or(Error::InvalidField("latitude"))?;
        let longitude = fields.next().ok_or(Error::InvalidField("longitude"))?;
        let east_west = fields.next().ok_or(Error::InvalidField("longitude"))?;

        // speed, course
        let date = fields.nth(2).ok_or(Error::InvalidField("date"))?;

        update(&mut self.fix.time, parse_time(time));

        let location = if status == "A" {
            parse_location(latitude, north_south, longitude, east_west)
        } else {
            None
        };

        update(&mut self.fix.location, location);
        update(&mut self.fix.date, parse_date(date));

        Ok(())
    }
}

/// Verifies framing and checksum, returns the sentence body
fn verify(text: &str) -> Result<&str, Error> {
    let text = text.strip_prefix('$').ok_or(Error::Framing)?;
    let (body, checksum) = text.rsplit_once('*').ok_or(Error::Framing)?;

    if checksum.len() != 2 {
        return Err(Error::ChecksumDigits);
    }

    let expected = u8::from_str_radix(checksum, 16).map_err(|_| Error::ChecksumDigits)?;
    let found = body.bytes().fold(0, |acc, b| acc ^ b);

    if expected != found {
        return Err(Error::Checksum { expected, found });
    }

    Ok(body)
}

/// Refreshes a [Field], retaining the last value when the new one is unavailable
fn update<T: Copy>(field: &mut Field<T>, value: Option<T>) {
    match value {
        Some(value) => *field = Field::valid(value),
        None => field.valid = false,
    }
}

/// Parses "hhmmss[.ss]"
fn parse_time(field: &str) -> Option<Time> {
    let hour = field.get(0..2)?.parse::<u8>().ok()?;
    let minute = field.get(2..4)?.parse::<u8>().ok()?;
    let second = field.get(4..6)?.parse::<u8>().ok()?;

    if hour > 23 || minute > 59 || second > 60 {
        return None;
    }

    Some(Time {
        hour,
        minute,
        second,
    })
}

/// Parses "ddmmyy"
fn parse_date(field: &str) -> Option<Date> {
    if field.len() != 6 {
        return None;
    }

    let day = field.get(0..2)?.parse::<u8>().ok()?;
    let month = field.get(2..4)?.parse::<u8>().ok()?;
    let year = field.get(4..6)?.parse::<u16>().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    Some(Date {
        year: 2000 + year,
        month,
        day,
    })
}

/// Parses "[d]ddmm.mmmm" and its hemisphere into signed decimal degrees
fn parse_coordinate(field: &str, hemisphere: &str, negative: &str, positive: &str) -> Option<f64> {
    let value = field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())?;

    let degrees = (value / 100.0).trunc();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    if hemisphere == negative {
        Some(-decimal)
    } else if hemisphere == positive {
        Some(decimal)
    } else {
        None
    }
}

fn parse_location(
    latitude: &str,
    north_south: &str,
    longitude: &str,
    east_west: &str,
) -> Option<Location> {
    Some(Location {
        latitude: parse_coordinate(latitude, north_south, "S", "N")?,
        longitude: parse_coordinate(longitude, east_west, "W", "E")?,
    })
}

/// Collects the satellite tuples of a visibility sentence.
/// Only complete tuples are retained: the trailing signal identifier
/// of NMEA 4.10 sentences is dropped.
fn decode_gsv<'a, I: Iterator<Item = &'a str>>(fields: &mut I) -> Result<Batch<'a>, Error> {
    // number of sentences, sentence index, satellites in view
    for name in ["sentences", "index", "satellites"] {
        fields.next().ok_or(Error::InvalidField(name))?;
    }

    let mut batch = Batch::default();

    let tuples = fields.by_ref().tuples::<(_, _, _, _)>().take(MAX_TUPLES);

    for (slot, (prn, elevation, azimuth, snr)) in batch.tuples.iter_mut().zip(tuples) {
        *slot = SatTuple {
            prn,
            elevation,
            azimuth,
            snr,
        };
    }

    Ok(batch)
}
