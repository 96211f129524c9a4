//! The monochrome frame buffer, written by the draw and clear opcodes.
use crate::definitions::display;

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. The buffer is stored row major, so `pixels()[row][column]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pixels: Vec<Vec<bool>>,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![vec![false; display::WIDTH]; display::HEIGHT],
        }
    }

    /// Turns all the pixels off.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(false);
        }
    }

    /// Will return the state of a single pixel, anything outside of the
    /// display is off.
    pub fn get(&self, row: usize, column: usize) -> bool {
        self.pixels
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// XORs a lit sprite bit into the given cell and reports if a lit pixel
    /// was turned off. Returns `None` if the cell is outside of the display.
    pub fn flip(&mut self, row: usize, column: usize) -> Option<bool> {
        let cell = self.pixels.get_mut(row)?.get_mut(column)?;
        let was_lit = *cell;
        *cell = !was_lit;
        Some(was_lit)
    }

    /// The intensity a renderer should paint the given pixel with.
    pub fn intensity(&self, row: usize, column: usize) -> u8 {
        if self.get(row, column) {
            display::PIXEL_ON
        } else {
            display::PIXEL_OFF
        }
    }

    /// Will return a immutable slice of the current display configuration
    pub fn pixels(&self) -> &[Vec<bool>] {
        &self.pixels[..]
    }

    /// Counts the lit pixels.
    pub fn lit(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|&&p| p).count())
            .sum()
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
