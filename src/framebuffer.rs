//! The 1 bit per pixel framebuffer the driver renders from, in page-major packed layout: byte
//! `x + (y / 8) * width` holds column `x`, rows `y..y + 8`, with row `y` in bit `y & 7`.

use crate::command::consts::{NUM_PIXEL_COLS, NUM_PIXEL_ROWS};

/// Bytes needed for the largest framebuffer the controller can show.
pub const MAX_BUF_LEN: usize = NUM_PIXEL_COLS as usize * NUM_PIXEL_ROWS as usize / 8;

/// Viewable dimensions of a display, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    width: u8,
    height: u8,
}

impl Geometry {
    /// The full 128x128 panel.
    pub const SIZE_128X128: Geometry = Geometry {
        width: NUM_PIXEL_COLS,
        height: NUM_PIXEL_ROWS,
    };

    /// Construct a geometry. Both dimensions must be non-zero multiples of 8 no larger than the
    /// controller's RAM, because the framebuffer packs 8 rows per byte and the controller packs 2
    /// columns per byte; any other size returns `None`.
    pub fn new(width: u8, height: u8) -> Option<Self> {
        if false
            || width == 0
            || height == 0
            || width > NUM_PIXEL_COLS
            || height > NUM_PIXEL_ROWS
            || width % 8 != 0
            || height % 8 != 0
        {
            return None;
        }
        Some(Geometry { width, height })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of framebuffer bytes for this geometry.
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize / 8
    }

    /// Number of controller column addresses (pixel pairs) in one row.
    pub fn column_pairs(&self) -> u8 {
        self.width / 2
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::SIZE_128X128
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    geometry: Geometry,
    buf: [u8; MAX_BUF_LEN],
}

impl Framebuffer {
    /// A framebuffer with every pixel off.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            buf: [0; MAX_BUF_LEN],
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The packed pixel bytes, exactly `geometry().buffer_len()` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.geometry.buffer_len()]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.geometry.buffer_len();
        &mut self.buf[..len]
    }

    /// Byte index and bit mask of pixel (`x`, `y`), or `None` if it lies outside the geometry.
    fn locate(&self, x: u8, y: u8) -> Option<(usize, u8)> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let index = x as usize + (y as usize / 8) * self.geometry.width as usize;
        Some((index, 1 << (y & 7)))
    }

    /// Whether pixel (`x`, `y`) is lit. Pixels outside the geometry read as off.
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        self.locate(x, y)
            .map_or(false, |(index, mask)| self.buf[index] & mask != 0)
    }

    /// Light or clear pixel (`x`, `y`). Writes outside the geometry are ignored.
    pub fn set_pixel(&mut self, x: u8, y: u8, on: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if on {
                self.buf[index] |= mask;
            } else {
                self.buf[index] &= !mask;
            }
        }
    }

    /// Set every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        let byte = if on { 0xFF } else { 0x00 };
        for b in self.as_bytes_mut() {
            *b = byte;
        }
    }

    pub fn clear(&mut self) {
        self.fill(false)
    }

    /// Overwrite this framebuffer with the pixels of `other`, which must share its geometry.
    pub fn copy_from(&mut self, other: &Framebuffer) {
        debug_assert_eq!(self.geometry, other.geometry);
        self.as_bytes_mut().copy_from_slice(other.as_bytes());
    }
}
