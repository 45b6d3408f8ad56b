//! Visibility aggregation: folds the satellite tuples of each decoded
//! visibility sentence into the [SatelliteTable].
use log::trace;

use crate::table::SatelliteTable;

/// Maximal number of satellites reported by one visibility sentence
pub const MAX_TUPLES: usize = 4;

/// One satellite, as text fields of a visibility sentence.
/// Unused slots of a partial sentence are empty.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SatTuple<'a> {
    pub prn: &'a str,
    pub elevation: &'a str,
    pub azimuth: &'a str,
    pub snr: &'a str,
}

/// Satellite tuples of one visibility sentence
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Batch<'a> {
    pub tuples: [SatTuple<'a>; MAX_TUPLES],
}

/// Parses a decimal field, empty or malformed text being 0
fn parse_or_zero(text: &str) -> u16 {
    text.trim().parse::<u16>().unwrap_or(0)
}

/// Writes all tuples of this [Batch] into the [SatelliteTable].
/// Tuples with absent, malformed or out of range identifiers are discarded.
/// Returns the number of refreshed satellites.
pub fn ingest(table: &mut SatelliteTable, batch: &Batch) -> usize {
    let mut refreshed = 0;

    for tuple in batch.tuples.iter() {
        let prn = match tuple.prn.trim().parse::<u8>() {
            Ok(prn) => prn,
            Err(_) => continue,
        };

        let (elevation, azimuth, snr) = (
            parse_or_zero(tuple.elevation),
            parse_or_zero(tuple.azimuth),
            parse_or_zero(tuple.snr),
        );

        if table.update(prn, elevation, azimuth, snr) {
            trace!(
                "PRN{:02} elev={} azim={} snr={}",
                prn, elevation, azimuth, snr
            );
            refreshed += 1;
        }
    }

    refreshed
}

#[cfg(test)]
mod test {
    use super::{Batch, SatTuple, ingest};
    use crate::table::SatelliteTable;

    fn tuple<'a>(prn: &'a str, elevation: &'a str, azimuth: &'a str, snr: &'a str) -> SatTuple<'a> {
        SatTuple {
            prn,
            elevation,
            azimuth,
            snr,
        }
    }

    #[test]
    fn full_batch() {
        let mut table = SatelliteTable::default();

        let batch = Batch {
            tuples: [
                tuple("03", "45", "120", "38"),
                tuple("07", "10", "200", "25"),
                tuple("16", "67", "015", ""),
                tuple("40", "5", "359", "12"),
            ],
        };

        assert_eq!(ingest(&mut table, &batch), 4);

        let prn3 = table.get(3).unwrap();
        assert!(prn3.active);
        assert_eq!((prn3.elevation, prn3.azimuth, prn3.snr), (45, 120, 38));

        // not tracked: empty SNR
        let prn16 = table.get(16).unwrap();
        assert!(prn16.active);
        assert_eq!((prn16.elevation, prn16.azimuth, prn16.snr), (67, 15, 0));

        assert!(table.get(40).unwrap().active);
    }

    #[test]
    fn partial_batch() {
        let mut table = SatelliteTable::default();

        let batch = Batch {
            tuples: [
                tuple("21", "30", "90", "41"),
                Default::default(),
                Default::default(),
                Default::default(),
            ],
        };

        assert_eq!(ingest(&mut table, &batch), 1);
        assert_eq!(table.active().map(|sat| sat.prn).collect::<Vec<_>>(), vec![21]);
    }

    #[test]
    fn discarded_identifiers() {
        let mut table = SatelliteTable::default();

        let batch = Batch {
            tuples: [
                tuple("0", "30", "90", "41"),
                tuple("41", "30", "90", "41"),
                tuple("abc", "30", "90", "41"),
                tuple("300", "30", "90", "41"),
            ],
        };

        assert_eq!(ingest(&mut table, &batch), 0);
        assert_eq!(table.active().count(), 0);

        for prn in 1..=40 {
            assert_eq!(table.get(prn).unwrap().elevation, 0);
        }
    }

    #[test]
    fn last_write_wins() {
        let mut table = SatelliteTable::default();

        let first = Batch {
            tuples: [tuple("07", "10", "200", "25"), Default::default(), Default::default(), Default::default()],
        };

        let second = Batch {
            tuples: [tuple("07", "12", "205", "30"), Default::default(), Default::default(), Default::default()],
        };

        ingest(&mut table, &first);
        ingest(&mut table, &second);

        let prn7 = table.get(7).unwrap();
        assert_eq!((prn7.elevation, prn7.azimuth, prn7.snr), (12, 205, 30));
        assert_eq!(table.active().count(), 1);
    }
}
