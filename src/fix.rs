//! Fix status, as maintained by the sentence decoder.
//! Every quantity is tagged with its own validity flag:
//! an unavailable value is data, not an error.
use hifitime::prelude::Epoch;

/// A value paired with its validity flag.
/// The last decoded value is retained even when it is no longer valid.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Field<T> {
    pub value: T,
    pub valid: bool,
}

impl<T: Copy> Field<T> {
    /// Builds a valid [Field]
    pub fn valid(value: T) -> Self {
        Self { value, valid: true }
    }

    /// Builds an invalid [Field]
    #[cfg(test)]
    pub fn invalid(value: T) -> Self {
        Self {
            value,
            valid: false,
        }
    }

    /// Returns the value, only if it is valid
    pub fn get(&self) -> Option<T> {
        if self.valid { Some(self.value) } else { None }
    }

    /// Converts the value, preserving its validity
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        Field {
            value: f(self.value),
            valid: self.valid,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees, negative south
    pub latitude: f64,
    /// Longitude in decimal degrees, negative west
    pub longitude: f64,
}

/// UTC calendar date
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// UTC time of day
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FixStatus {
    pub location: Field<Location>,
    pub date: Field<Date>,
    pub time: Field<Time>,
    /// Satellites in use
    pub satellites: Field<u32>,
    /// Horizontal dilution of precision
    pub hdop: Field<f64>,
}

impl FixStatus {
    /// Returns the UTC [Epoch] of this fix, when both date and time are valid
    /// and describe an existing calendar instant.
    pub fn epoch(&self) -> Option<Epoch> {
        let date = self.date.get()?;
        let time = self.time.get()?;

        Epoch::maybe_from_gregorian_utc(
            date.year as i32,
            date.month,
            date.day,
            time.hour,
            time.minute,
            time.second,
            0,
        )
        .ok()
    }

    /// Returns the ISO-8601 UTC timestamp of this fix.
    pub fn timestamp(&self) -> Option<String> {
        let (date, time) = (self.date.value, self.time.value);

        // only calendar instants that exist
        self.epoch().map(|_| {
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                date.year, date.month, date.day, time.hour, time.minute, time.second
            )
        })
    }
}
