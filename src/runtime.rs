use hifitime::prelude::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, trace};

use crate::{
    aggregator::{self, Batch},
    fix::FixStatus,
    report::Reporter,
    snapshot::{SessionId, Snapshot},
    table::SatelliteTable,
};

/// Pipeline state, owned by the control loop
#[derive(Debug)]
pub struct Runtime {
    /// Epoch of deployment
    deploy_time: Epoch,

    /// Visibility of the current interval
    table: SatelliteTable,

    /// Last emitted sequence number
    sequence: u64,

    /// [SessionId] of this process
    session: SessionId,

    /// When set, ticks without a valid location do not emit a [Snapshot]
    require_fix: bool,
}

impl Runtime {
    pub fn new(deploy_time: Epoch, session: SessionId, require_fix: bool) -> Self {
        Self {
            deploy_time,
            session,
            require_fix,
            sequence: 0,
            table: Default::default(),
        }
    }

    /// Folds one visibility [Batch] into the table
    pub fn ingest(&mut self, batch: &Batch) {
        aggregator::ingest(&mut self.table, batch);
    }

    /// Builds the [Snapshot] of this tick, if one should be emitted.
    /// The satellite table is left untouched: call [Self::reset]
    /// once every sink has consumed the [Snapshot].
    pub fn snapshot(&mut self, fix: &FixStatus) -> Option<Snapshot> {
        if self.require_fix && !fix.location.valid {
            trace!("no valid location: snapshot skipped");
            return None;
        }

        self.sequence += 1;

        let snapshot = Snapshot::build(&self.table, fix, self.sequence, &self.session);

        debug!(
            "snapshot #{} - PRN [{}]",
            snapshot.sequence,
            snapshot.satellites.iter().map(|sat| sat.prn).join(",")
        );

        Some(snapshot)
    }

    /// Starts a new reporting interval
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Serves one reporting tick: the [Snapshot] is published to all sinks,
    /// then a new interval starts. Ticks that do not emit a [Snapshot]
    /// keep accumulating satellites.
    pub fn tick(&mut self, fix: &FixStatus, reporter: &mut Reporter) {
        match self.snapshot(fix) {
            Some(snapshot) => {
                reporter.publish(Some(&snapshot));
                self.reset();
            },
            None => reporter.publish(None),
        }
    }

    /// Last emitted sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn table(&self) -> &SatelliteTable {
        &self.table
    }

    /// Time elapsed since deployment
    pub fn uptime(&self, now: Epoch) -> Duration {
        now - self.deploy_time
    }
}

#[cfg(test)]
mod test {
    use super::Runtime;
    use crate::{
        aggregator::{Batch, SatTuple},
        fix::{Field, FixStatus, Location},
        report::{Reporter, test::Recorder},
        snapshot::SessionId,
    };
    use hifitime::prelude::{Duration, Epoch};
    use std::str::FromStr;

    fn runtime(require_fix: bool) -> Runtime {
        let t0 = Epoch::from_str("2024-03-09T00:00:00 UTC").unwrap();
        Runtime::new(t0, SessionId::new("test", t0), require_fix)
    }

    fn batch<'a>(tuples: &[(&'a str, &'a str, &'a str, &'a str)]) -> Batch<'a> {
        let mut batch = Batch::default();
        for (i, &(prn, elevation, azimuth, snr)) in tuples.iter().enumerate() {
            batch.tuples[i] = SatTuple {
                prn,
                elevation,
                azimuth,
                snr,
            };
        }
        batch
    }

    #[test]
    fn interval_reset() {
        let mut rtm = runtime(false);
        let fix = FixStatus::default();

        rtm.ingest(&batch(&[("3", "45", "120", "38"), ("7", "10", "200", "25")]));

        let snapshot = rtm.snapshot(&fix).unwrap();
        assert_eq!(snapshot.sequence, 1);

        let prns = snapshot.satellites.iter().map(|sat| sat.prn).collect::<Vec<_>>();
        assert_eq!(prns, vec![3, 7]);
        assert_eq!(snapshot.max_snr(), 38);

        rtm.reset();
        assert_eq!(rtm.table().active().count(), 0);

        rtm.ingest(&batch(&[("7", "12", "205", "30")]));

        let snapshot = rtm.snapshot(&fix).unwrap();
        assert_eq!(snapshot.sequence, 2);
        assert_eq!(snapshot.satellites.len(), 1);
        assert_eq!(snapshot.satellites[0].prn, 7);
        assert_eq!(snapshot.satellites[0].snr, 30);
    }

    #[test]
    fn snapshot_without_fix() {
        let mut rtm = runtime(false);
        assert!(rtm.snapshot(&FixStatus::default()).is_some());
        assert!(rtm.snapshot(&FixStatus::default()).is_some());
        assert_eq!(rtm.sequence(), 2);
    }

    #[test]
    fn required_fix() {
        let mut rtm = runtime(true);

        rtm.ingest(&batch(&[("12", "45", "120", "38")]));

        assert!(rtm.snapshot(&FixStatus::default()).is_none());
        assert_eq!(rtm.sequence(), 0);

        let fix = FixStatus {
            location: Field::valid(Location {
                latitude: -6.914744,
                longitude: 107.60981,
            }),
            ..Default::default()
        };

        // satellites seen while searching are still reported
        let snapshot = rtm.snapshot(&fix).unwrap();
        assert_eq!(snapshot.sequence, 1);
        assert_eq!(snapshot.satellites.len(), 1);
    }

    #[test]
    fn tick() {
        let mut rtm = runtime(true);
        let recorder = Recorder::default();
        let mut reporter = Reporter::default().with_sink(recorder.clone());

        let fix = FixStatus {
            location: Field::valid(Location::default()),
            ..Default::default()
        };

        rtm.ingest(&batch(&[("5", "45", "120", "38")]));
        rtm.tick(&FixStatus::default(), &mut reporter);

        // searching: not reset
        assert_eq!(rtm.table().active().count(), 1);

        rtm.tick(&fix, &mut reporter);
        assert_eq!(rtm.table().active().count(), 0);

        rtm.tick(&fix, &mut reporter);

        assert_eq!(*recorder.events.borrow(), vec![None, Some(1), Some(2)]);
    }

    #[test]
    fn uptime() {
        let rtm = runtime(false);
        let now = Epoch::from_str("2024-03-09T00:01:00 UTC").unwrap();
        assert_eq!(rtm.uptime(now), Duration::from_seconds(60.0));
        assert!(rtm.session().as_str().starts_with("test-"));
    }
}
