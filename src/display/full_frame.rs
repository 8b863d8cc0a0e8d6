//! Full-frame refresh. Every refresh sends the start of the framebuffer verbatim using page
//! addressing: for each of 8 pages, a page select, a column start of 2, and then 8 data
//! transactions of 16 bytes each.
//!
//! The bytes go out in their 1 bit per pixel form, without nibble packing. On a 4 bit per pixel
//! controller this only reproduces the framebuffer's on/off pattern as far as the page-addressed
//! RAM is concerned, and only for the first 1024 framebuffer bytes. Use `RefreshMode::Delta` for
//! grayscale-correct output.

use crate::command::Command;
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::interface::DisplayInterface;

const PAGES: u8 = 8;
const GROUPS_PER_PAGE: u8 = 8;
const GROUP_LEN: usize = 16;

/// Page addressing column start, as (low nibble, high nibble).
const COLUMN_START: (u8, u8) = (0x2, 0x0);

/// Framebuffer bytes sent by one full-frame refresh.
pub const FULL_FRAME_LEN: usize = PAGES as usize * GROUPS_PER_PAGE as usize * GROUP_LEN;

pub(crate) struct FullFrame;

impl FullFrame {
    /// Send the frame, returning the number of pixel data bytes sent.
    pub(crate) fn refresh<DI>(
        &mut self,
        iface: &mut DI,
        fb: &Framebuffer,
    ) -> Result<usize, Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let frame = fb
            .as_bytes()
            .get(..FULL_FRAME_LEN)
            .ok_or(Error::UnsupportedGeometry)?;

        let groups = iproduct!(0..PAGES, 0..GROUPS_PER_PAGE);
        for ((page, group), chunk) in groups.zip(frame.chunks(GROUP_LEN)) {
            if group == 0 {
                Command::SetPageStart(page).send(iface)?;
                Command::SetLowerColumnStart(COLUMN_START.0).send(iface)?;
                Command::SetHigherColumnStart(COLUMN_START.1).send(iface)?;
            }
            iface.send_data(chunk).map_err(Error::Interface)?;
        }
        Ok(frame.len())
    }
}
