//! Two line summary for small character displays.
use log::debug;

use crate::{report::Sink, snapshot::Snapshot};

const TITLE: &str = "GNSS Data Logger";

const SEARCHING: &str = "Searching signal";

/// Character display geometry
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayGeometry {
    pub cols: usize,
    pub rows: usize,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self { cols: 16, rows: 2 }
    }
}

/// Character display driver. Text printed past the last column is lost.
pub trait CharacterDisplay {
    fn geometry(&self) -> DisplayGeometry;

    /// Blanks the whole display
    fn clear(&mut self);

    /// Prints `text` starting at (`col`, `row`)
    fn print_at(&mut self, col: usize, row: usize, text: &str);

    /// Commits the current content
    fn flush(&mut self) {}
}

/// In-memory [CharacterDisplay]
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    geometry: DisplayGeometry,
    cells: Vec<Vec<char>>,
}

impl FrameBuffer {
    pub fn new(geometry: DisplayGeometry) -> Self {
        Self {
            geometry,
            cells: vec![vec![' '; geometry.cols]; geometry.rows],
        }
    }

    /// Returns content of given row
    pub fn row(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|cells| cells.iter().collect())
            .unwrap_or_default()
    }
}

impl CharacterDisplay for FrameBuffer {
    fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(' ');
        }
    }

    fn print_at(&mut self, col: usize, row: usize, text: &str) {
        if let Some(cells) = self.cells.get_mut(row) {
            for (cell, c) in cells.iter_mut().skip(col).zip(text.chars()) {
                *cell = c;
            }
        }
    }

    fn flush(&mut self) {
        for row in 0..self.geometry.rows {
            debug!("display[{}] \"{}\"", row, self.row(row));
        }
    }
}

/// Projects each [Snapshot] onto a [CharacterDisplay]
pub struct Display<D: CharacterDisplay> {
    display: D,
}

impl<D: CharacterDisplay> Display<D> {
    pub fn new(display: D) -> Self {
        Self { display }
    }

    /// Startup screen
    pub fn splash(&mut self) {
        self.display.clear();
        self.display.print_at(0, 0, TITLE);
        self.display.flush();
    }

    fn searching(&mut self) {
        self.display.clear();
        self.display.print_at(0, 0, SEARCHING);
        self.display.flush();
    }

    /// Prints `value` on the left side of this row and `suffix`
    /// right aligned, overwriting the value when the row is too short
    fn print_row(&mut self, row: usize, value: &str, suffix: &str) {
        let cols = self.display.geometry().cols;
        let suffix_col = cols.saturating_sub(suffix.chars().count());

        self.display.print_at(0, row, value);
        self.display.print_at(suffix_col, row, suffix);
    }

    #[cfg(test)]
    pub fn inner(&self) -> &D {
        &self.display
    }
}

impl<D: CharacterDisplay> Sink for Display<D> {
    fn consume(&mut self, snapshot: &Snapshot) {
        let location = match snapshot.fix.location.get() {
            Some(location) => location,
            None => {
                self.searching();
                return;
            },
        };

        self.display.clear();

        self.print_row(
            0,
            &format!("{:.6}", location.latitude),
            &snapshot.fix.satellites.value.to_string(),
        );

        self.print_row(
            1,
            &format!("{:.6}", location.longitude),
            &snapshot.max_snr().to_string(),
        );

        self.display.flush();
    }

    fn idle(&mut self) {
        self.searching();
    }
}
