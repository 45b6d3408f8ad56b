use hifitime::prelude::Epoch;

use crate::{
    fix::FixStatus,
    table::{SatelliteRecord, SatelliteTable},
};

/// Session identifier, stable for the whole process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct SessionId(String);

impl SessionId {
    /// Derives the [SessionId] from a hardware identifier and the boot [Epoch]
    pub fn new(hardware_id: &str, boot: Epoch) -> Self {
        let boot_ms = boot.to_unix_milliseconds().round().max(0.0) as u64;
        Self(format!("{}-{:X}", hardware_id, boot_ms))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable content of one reporting interval
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Sequence number
    pub sequence: u64,

    /// [FixStatus] at snapshot time
    pub fix: FixStatus,

    /// [SessionId]
    pub session: SessionId,

    /// Satellites seen during this interval, ascending PRN
    pub satellites: Vec<SatelliteRecord>,
}

impl Snapshot {
    /// Builds a [Snapshot] from current [SatelliteTable] content.
    /// The table is not modified.
    pub fn build(
        table: &SatelliteTable,
        fix: &FixStatus,
        sequence: u64,
        session: &SessionId,
    ) -> Self {
        Self {
            sequence,
            fix: *fix,
            session: session.clone(),
            satellites: table.active().copied().collect(),
        }
    }

    /// Strongest SNR of this interval, 0 when no satellite was seen
    pub fn max_snr(&self) -> u16 {
        self.satellites
            .iter()
            .map(|sat| sat.snr)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::{SessionId, Snapshot};
    use crate::{fix::FixStatus, table::SatelliteTable};
    use hifitime::prelude::Epoch;
    use std::str::FromStr;

    #[test]
    fn session_id() {
        let boot = Epoch::from_str("2024-03-09T00:00:00 UTC").unwrap();
        let session = SessionId::new("ttyUSB0", boot);
        assert_eq!(session.as_str(), "ttyUSB0-18E20826400");
        assert_eq!(session.to_string(), "ttyUSB0-18E20826400");
    }

    #[test]
    fn active_satellites_in_prn_order() {
        let mut table = SatelliteTable::default();
        let session = SessionId("test".to_string());

        for prn in [33, 2, 17, 9] {
            table.update(prn, 10, 20, prn as u16);
        }

        table.update(12, 1, 1, 1);
        table.reset();

        for prn in [33, 2, 17, 9] {
            table.update(prn, 10, 20, prn as u16);
        }

        let snapshot = Snapshot::build(&table, &FixStatus::default(), 1, &session);

        let prns = snapshot
            .satellites
            .iter()
            .map(|sat| sat.prn)
            .collect::<Vec<_>>();

        assert_eq!(prns, vec![2, 9, 17, 33]);
        assert_eq!(snapshot.max_snr(), 33);

        // table untouched
        assert_eq!(table.active().count(), 4);
    }

    #[test]
    fn empty_interval() {
        let table = SatelliteTable::default();
        let session = SessionId("test".to_string());

        let snapshot = Snapshot::build(&table, &FixStatus::default(), 7, &session);

        assert_eq!(snapshot.sequence, 7);
        assert!(snapshot.satellites.is_empty());
        assert_eq!(snapshot.max_snr(), 0);
    }
}
