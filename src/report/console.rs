use std::io::Write;

use log::error;

use crate::{
    fix::Field,
    format::{format_date_time, format_float, format_int},
    report::Sink,
    snapshot::Snapshot,
};

const TITLE: &str =
    "============================ GNSS Data Logger ============================";

const COLUMNS: &str = "No.  | Date     Time     Latitude    Longitude     Sats  HDOP";

const SEPARATOR: &str =
    "--------------------------------------------------------------------------";

const DETAILS_BANNER: &str = "  --- Visible satellites (PRN, Elev, Azim, SNR) ---";

const DETAILS_FOOTER: &str = "  -------------------------------------------------";

/// Fixed width text table, one row per [Snapshot]
pub struct Console<W: Write> {
    w: W,
}

impl<W: Write> Console<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    /// Releases the column titles, once at startup
    pub fn header(&mut self) -> std::io::Result<()> {
        writeln!(self.w, "{}", TITLE)?;
        writeln!(self.w, "{}", COLUMNS)?;
        writeln!(self.w, "{}", SEPARATOR)?;
        self.w.flush()
    }

    fn release(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let fix = &snapshot.fix;

        let mut row = format!("{:<4} | ", snapshot.sequence);

        row.push_str(&format_date_time(fix.date, fix.time));
        row.push_str(&format_float(fix.location.map(|loc| loc.latitude), 12, 6));
        row.push_str(&format_float(fix.location.map(|loc| loc.longitude), 13, 6));
        row.push_str(&format_int(fix.satellites.map(u64::from), 6));
        row.push_str(&format_float(fix.hdop, 6, 2));

        writeln!(self.w, "{}", row)?;

        if !snapshot.satellites.is_empty() {
            writeln!(self.w, "{}", DETAILS_BANNER)?;

            for sat in snapshot.satellites.iter() {
                writeln!(
                    self.w,
                    "    PRN: {} Elev: {} Azim: {} SNR: {}",
                    format_int(Field::valid(sat.prn as u64), 3),
                    format_int(Field::valid(sat.elevation as u64), 3),
                    format_int(Field::valid(sat.azimuth as u64), 4),
                    format_int(Field::valid(sat.snr as u64), 4),
                )?;
            }

            writeln!(self.w, "{}", DETAILS_FOOTER)?;
        }

        self.w.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> Sink for Console<W> {
    fn consume(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.release(snapshot) {
            error!("#{} - console error: {}", snapshot.sequence, e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::Console;
    use crate::{
        fix::{Date, Field, FixStatus, Location, Time},
        report::Sink,
        snapshot::{SessionId, Snapshot},
        table::SatelliteTable,
    };
    use hifitime::prelude::Epoch;
    use std::str::FromStr;

    fn session() -> SessionId {
        SessionId::new("test", Epoch::from_str("2024-03-09T00:00:00 UTC").unwrap())
    }

    fn release(snapshot: &Snapshot) -> String {
        let mut console = Console::new(Vec::new());
        console.consume(snapshot);
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn header() {
        let mut console = Console::new(Vec::new());
        console.header().unwrap();

        let content = String::from_utf8(console.into_inner()).unwrap();
        let lines = content.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("No.  | Date"));
    }

    #[test]
    fn full_row() {
        let mut table = SatelliteTable::default();
        table.update(3, 45, 120, 38);
        table.update(7, 10, 200, 25);

        let fix = FixStatus {
            location: Field::valid(Location {
                latitude: -6.914744,
                longitude: 107.60981,
            }),
            date: Field::valid(Date {
                year: 2024,
                month: 3,
                day: 9,
            }),
            time: Field::valid(Time {
                hour: 12,
                minute: 30,
                second: 5,
            }),
            satellites: Field::valid(8),
            hdop: Field::valid(0.97),
        };

        let snapshot = Snapshot::build(&table, &fix, 12, &session());
        let content = release(&snapshot);
        let lines = content.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 5);

        assert_eq!(
            lines[0],
            "12   | 09/03/24 12:30:05 -6.914744   107.609810   8     0.97  "
        );

        assert_eq!(lines[1], "  --- Visible satellites (PRN, Elev, Azim, SNR) ---");
        assert_eq!(lines[2], "    PRN: 3   Elev: 45  Azim: 120  SNR: 38  ");
        assert_eq!(lines[3], "    PRN: 7   Elev: 10  Azim: 200  SNR: 25  ");
        assert!(lines[4].starts_with("  ---"));
    }

    #[test]
    fn acquisition_row() {
        let table = SatelliteTable::default();
        let snapshot = Snapshot::build(&table, &FixStatus::default(), 1, &session());

        let content = release(&snapshot);
        let lines = content.lines().collect::<Vec<_>>();

        // no active satellite: no detail block
        assert_eq!(lines.len(), 1);

        assert_eq!(
            lines[0],
            "1    | ********** ******** *********** ************ ***** ***** "
        );
    }
}
