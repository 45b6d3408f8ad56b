/// Highest PRN the table can hold (slot = PRN - 1)
pub const MAX_SATELLITES: usize = 40;

/// Latest visibility of a single satellite
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SatelliteRecord {
    /// PRN (1..=40)
    pub prn: u8,
    /// Elevation in degrees
    pub elevation: u16,
    /// Azimuth in degrees
    pub azimuth: u16,
    /// Signal to noise ratio
    pub snr: u16,
    /// True when refreshed during the current reporting interval
    pub active: bool,
}

/// Fixed capacity [SatelliteRecord] arena, addressed by PRN
#[derive(Debug, Clone)]
pub struct SatelliteTable {
    slots: [SatelliteRecord; MAX_SATELLITES],
}

impl Default for SatelliteTable {
    fn default() -> Self {
        Self {
            slots: [SatelliteRecord::default(); MAX_SATELLITES],
        }
    }
}

impl SatelliteTable {
    /// Converts a PRN to its slot index, rejecting identifiers out of range
    fn slot(prn: u8) -> Option<usize> {
        if (1..=MAX_SATELLITES).contains(&(prn as usize)) {
            Some(prn as usize - 1)
        } else {
            None
        }
    }

    /// Refreshes the record of this PRN and marks it active.
    /// Returns false when the PRN cannot be stored.
    pub fn update(&mut self, prn: u8, elevation: u16, azimuth: u16, snr: u16) -> bool {
        match Self::slot(prn) {
            Some(index) => {
                self.slots[index] = SatelliteRecord {
                    prn,
                    elevation,
                    azimuth,
                    snr,
                    active: true,
                };
                true
            },
            None => false,
        }
    }

    /// Returns the record of this PRN, whether active or not
    #[cfg(test)]
    pub fn get(&self, prn: u8) -> Option<&SatelliteRecord> {
        Self::slot(prn).map(|index| &self.slots[index])
    }

    /// Iterates over active records, in ascending PRN order
    pub fn active(&self) -> impl Iterator<Item = &SatelliteRecord> {
        self.slots.iter().filter(|record| record.active)
    }

    /// Clears all active flags, starting a new reporting interval
    pub fn reset(&mut self) {
        for record in self.slots.iter_mut() {
            record.active = false;
        }
    }
}
