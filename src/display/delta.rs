//! Delta refresh against a shadow copy of what the panel shows.
//!
//! Each row of the framebuffer is compared with the shadow one column pair (one display RAM byte)
//! at a time. Only the span from the first to the last changed pair of a row is sent, nibble
//! packed, and rows without changes are skipped. The controller advances its write pointer by one
//! column per byte and wraps at the edges of its address window, so the encoder mirrors that
//! pointer and only re-programs the window when the next span does not start where the pointer
//! already is.

use itertools::{Itertools, MinMaxResult};

use crate::command::consts::NUM_BUF_COLS;
use crate::command::{send_sequence, Command};
use crate::error::Error;
use crate::framebuffer::{Framebuffer, Geometry};
use crate::interface::DisplayInterface;

/// Intensity sent for a lit pixel. Unlit pixels are sent as 0.
const LIT: u8 = 0x0F;

/// The controller's write pointer together with the address window it wraps within.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cursor {
    col: u8,
    row: u8,
    first_col: u8,
    last_col: u8,
    first_row: u8,
    last_row: u8,
}

impl Cursor {
    /// The pointer as left by programming the window `first_col..=last_col`,
    /// `first_row..=last_row`.
    fn window(first_col: u8, last_col: u8, first_row: u8, last_row: u8) -> Self {
        Self {
            col: first_col,
            row: first_row,
            first_col,
            last_col,
            first_row,
            last_row,
        }
    }

    fn program<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        send_sequence(
            &[
                Command::SetRowAddress(self.first_row, self.last_row),
                Command::SetColumnAddress(self.first_col, self.last_col),
            ],
            iface,
        )
    }

    fn is_at(&self, col: u8, row: u8) -> bool {
        self.col == col && self.row == row
    }

    /// Account for `n` data bytes written at the pointer.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.col < self.last_col {
                self.col += 1;
                continue;
            }
            self.col = self.first_col;
            self.row = if self.row < self.last_row {
                self.row + 1
            } else {
                self.first_row
            };
        }
    }
}

/// The two pixels of column pair `pair` in `row`.
fn pair_pixels(fb: &Framebuffer, pair: u8, row: u8) -> (bool, bool) {
    (fb.pixel(2 * pair, row), fb.pixel(2 * pair + 1, row))
}

/// Pack a column pair into one display RAM byte, the even (left) column in the high nibble.
fn pack_pair(fb: &Framebuffer, pair: u8, row: u8) -> u8 {
    let nibble = |on: bool| if on { LIT } else { 0 };
    let (left, right) = pair_pixels(fb, pair, row);
    nibble(left) << 4 | nibble(right)
}

pub(crate) struct Delta {
    shadow: Framebuffer,
    /// Whether the shadow reflects the panel. Cleared on init, since display RAM content is
    /// undefined after reset.
    synced: bool,
}

impl Delta {
    pub(crate) fn new(geometry: Geometry) -> Self {
        Self {
            shadow: Framebuffer::new(geometry),
            synced: false,
        }
    }

    pub(crate) fn shadow(&self) -> &Framebuffer {
        &self.shadow
    }

    /// Forget what the panel shows, so the next refresh sends every row in full.
    pub(crate) fn invalidate(&mut self) {
        self.synced = false;
    }

    /// First and last changed column pair of `row`, if any changed.
    fn dirty_span(&self, fb: &Framebuffer, row: u8) -> Option<(u8, u8)> {
        let pairs = 0..fb.geometry().column_pairs();
        if !self.synced {
            return Some((0, pairs.end - 1));
        }
        let changed = pairs
            .filter(|&pair| pair_pixels(fb, pair, row) != pair_pixels(&self.shadow, pair, row));
        match changed.minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(pair) => Some((pair, pair)),
            MinMaxResult::MinMax(first, last) => Some((first, last)),
        }
    }

    /// Send what changed since the last refresh, returning the number of pixel data bytes sent.
    /// The shadow is only updated once the whole frame went out. After a failure some rows may
    /// have reached the panel (possibly in part), so the next refresh sends every row.
    pub(crate) fn refresh<DI>(
        &mut self,
        iface: &mut DI,
        fb: &Framebuffer,
    ) -> Result<usize, Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        match self.send_changes(iface, fb) {
            Ok(total) => {
                self.shadow.copy_from(fb);
                self.synced = true;
                Ok(total)
            }
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }

    fn send_changes<DI>(&self, iface: &mut DI, fb: &Framebuffer) -> Result<usize, Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let geometry = fb.geometry();
        let last_col = geometry.column_pairs() - 1;
        let last_row = geometry.height() - 1;

        let mut cursor = Cursor::window(0, last_col, 0, last_row);
        cursor.program(iface)?;

        let mut row_buf = [0u8; NUM_BUF_COLS as usize];
        let mut total = 0;
        for row in 0..geometry.height() {
            let (first, last) = match self.dirty_span(fb, row) {
                Some(span) => span,
                None => continue,
            };
            if !cursor.is_at(first, row) {
                cursor = Cursor::window(first, last_col, row, last_row);
                cursor.program(iface)?;
            }

            let len = (last - first) as usize + 1;
            for (slot, pair) in row_buf.iter_mut().zip(first..=last) {
                *slot = pack_pair(fb, pair, row);
            }
            iface
                .send_data(&row_buf[..len])
                .map_err(Error::Interface)?;
            cursor.advance(len);
            total += len;
        }
        Ok(total)
    }
}
