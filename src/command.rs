//! The command set for the SSD1327.
//!
//! Note 1: The display RAM of the SSD1327 is arranged in 128 rows and 64 columns, where each
//! column is one byte holding 2 adjacent pixels (segments) in the row as 4-bit intensities, for a
//! total resolution of 128x128. Thus, anywhere there is a "column" address, it refers to a
//! horizontal pair of pixels.

use heapless::Vec;

use crate::error::Error;
use crate::interface::DisplayInterface;

pub mod consts {
    //! Dimensions of the SSD1327 display RAM.

    pub const NUM_PIXEL_COLS: u8 = 128;
    pub const NUM_PIXEL_ROWS: u8 = 128;
    pub const NUM_BUF_COLS: u8 = NUM_PIXEL_COLS / 2;
    pub const PIXEL_ROW_MAX: u8 = NUM_PIXEL_ROWS - 1;
    pub const BUF_COL_MAX: u8 = NUM_BUF_COLS - 1;
}

use self::consts::*;

/// Longest encoding of a single command: opcode plus two operands.
const MAX_COMMAND_LEN: usize = 3;

/// Capacity of the buffer `send_sequence` assembles a command transaction in.
pub const SEQUENCE_BUF_LEN: usize = 64;

/// The address increment orientation when writing image data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IncrementAxis {
    /// The column address increments as image data is written, left to right within the range
    /// set by `SetColumnAddress`, then top to bottom within the range set by `SetRowAddress`.
    Horizontal,
    /// The row address increments as image data is written, top to bottom within the range set
    /// by `SetRowAddress`, then left to right within the range set by `SetColumnAddress`.
    Vertical,
}

/// Setting of column address remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColumnRemap {
    /// Column addresses 0->63 map to segments 0,1->126,127.
    Forward,
    /// Column addresses 0->63 map to segments 126,127->0,1.
    Reverse,
}

/// Setting of data nibble remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NibbleRemap {
    /// The high nibble of each byte drives the left pixel of the column.
    Forward,
    /// The low nibble of each byte drives the left pixel of the column.
    Reverse,
}

/// Setting of the COM line scanning of rows. Changing this setting will flip the image vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComScanDirection {
    /// Row address 0 is the first row of the display.
    RowZeroFirst,
    /// Row address 0 is the last row of the display.
    RowZeroLast,
}

/// Setting the layout of the COM lines to the display rows. This is dictated by how the module
/// wires the OLED matrix to the controller; anything but the module's setting yields a corrupted
/// image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComLayout {
    /// COM lines 0->127 map to display rows 0->127.
    Sequential,
    /// COM lines alternate between the two sides of the panel (odd/even split).
    OddEvenSplit,
}

/// Setting of the display mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// The display operates normally, showing the image in the display RAM.
    Normal,
    /// All pixels forced ON at grayscale level 15, regardless of display RAM.
    AllOn,
    /// All pixels forced OFF, regardless of display RAM.
    AllOff,
    /// The image in display RAM shown with grayscale levels inverted (0->15, ..., 15->0).
    Inverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the column start and end address range when writing to the display RAM. The column
    /// address pointer is reset to the start column. Range is 0-63. (Note 1)
    SetColumnAddress(u8, u8),
    /// Set the row start and end address range when writing to the display RAM. The row address
    /// pointer is reset to the start row. Range is 0-127.
    SetRowAddress(u8, u8),
    /// Set the contrast current. Range 0-255.
    SetContrastCurrent(u8),
    /// Set the address increment direction, column remap, nibble remap, COM scan direction and
    /// COM layout. See the documentation for each enum.
    SetRemapping(
        IncrementAxis,
        ColumnRemap,
        NibbleRemap,
        ComScanDirection,
        ComLayout,
    ),
    /// Set the display RAM row shown on the first display row, rolling the image upwards.
    /// Range is 0-127.
    SetStartLine(u8),
    /// Set the display COM line offset, rolling both the image and the active rows upwards.
    /// Range is 0-127.
    SetDisplayOffset(u8),
    /// Set the display operating mode. See enum for details.
    SetDisplayMode(DisplayMode),
    /// Set the MUX ratio, the number of active COM lines. Range 16-128.
    SetMuxRatio(u8),
    /// Enable or disable the internal VDD regulator.
    SetInternalRegulator(bool),
    /// Control sleep mode. Sleep is the display-off state; waking turns the panel on.
    SetSleepMode(bool),
    /// Set the reset (phase 1) and first pre-charge (phase 2) lengths. Each ranges 1-15.
    SetPhaseLengths(u8, u8),
    /// Set the oscillator frequency Fosc (0-15, higher is faster) and the display clock divide
    /// ratio setting (0-15).
    SetClockDivider(u8, u8),
    /// Set the second pre-charge period. Range 0-15 DCLKs.
    SetSecondPrechargePeriod(u8),
    /// Set the pre-charge voltage level. Range 0-15.
    SetPrechargeVoltage(u8),
    /// Set the COM deselect voltage level. Range 0-15.
    SetComDeselectVoltage(u8),
    /// Function selection B: enable the second pre-charge phase, and select the external VSL.
    SetFunctionSelectionB(bool, bool),
    /// Set whether the command lock is enabled. Enabling the command lock blocks all commands
    /// except `SetCommandLock`.
    SetCommandLock(bool),
    /// Page start address for page addressing mode, as issued by the full-frame refresh. Range
    /// 0-7.
    SetPageStart(u8),
    /// Lower nibble of the page addressing mode column start. Range 0-15.
    SetLowerColumnStart(u8),
    /// Higher nibble of the page addressing mode column start. Range 0-15.
    SetHigherColumnStart(u8),
}

/// The power-on initialization, sent as one command transaction by `Display::init`.
pub const INIT_SEQUENCE: [Command; 17] = [
    Command::SetSleepMode(true),
    Command::SetContrastCurrent(0x80),
    Command::SetRemapping(
        IncrementAxis::Horizontal,
        ColumnRemap::Reverse,
        NibbleRemap::Forward,
        ComScanDirection::RowZeroLast,
        ComLayout::OddEvenSplit,
    ),
    Command::SetStartLine(0),
    Command::SetDisplayOffset(0),
    Command::SetDisplayMode(DisplayMode::AllOff),
    Command::SetMuxRatio(NUM_PIXEL_ROWS),
    Command::SetPhaseLengths(1, 1),
    Command::SetClockDivider(0, 0),
    Command::SetInternalRegulator(true),
    Command::SetSecondPrechargePeriod(4),
    Command::SetComDeselectVoltage(0x0F),
    Command::SetPrechargeVoltage(0x08),
    Command::SetFunctionSelectionB(true, false),
    Command::SetCommandLock(false),
    Command::SetDisplayMode(DisplayMode::Normal),
    Command::SetSleepMode(false),
];

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[]) => {{
        $buf[0] = $cmd;
        Some(&$buf[..1])
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr]) => {{
        $buf[0] = $cmd;
        $buf[1] = $arg0;
        Some(&$buf[..2])
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr, $arg1:expr]) => {{
        $buf[0] = $cmd;
        $buf[1] = $arg0;
        $buf[2] = $arg1;
        Some(&$buf[..3])
    }};
}

impl Command {
    /// Encode the opcode and operands into `buf`, returning the used prefix, or `None` if an
    /// operand is out of range.
    pub fn encode(self, buf: &mut [u8; MAX_COMMAND_LEN]) -> Option<&[u8]> {
        match self {
            Command::SetColumnAddress(start, end) => match (start, end) {
                (0..=BUF_COL_MAX, 0..=BUF_COL_MAX) => ok_command!(buf, 0x15, [start, end]),
                _ => None,
            },
            Command::SetRowAddress(start, end) => match (start, end) {
                (0..=PIXEL_ROW_MAX, 0..=PIXEL_ROW_MAX) => ok_command!(buf, 0x75, [start, end]),
                _ => None,
            },
            Command::SetContrastCurrent(current) => ok_command!(buf, 0x81, [current]),
            Command::SetRemapping(
                increment_axis,
                column_remap,
                nibble_remap,
                com_scan_direction,
                com_layout,
            ) => {
                let cr = match column_remap {
                    ColumnRemap::Forward => 0x00,
                    ColumnRemap::Reverse => 0x01,
                };
                let nr = match nibble_remap {
                    NibbleRemap::Forward => 0x00,
                    NibbleRemap::Reverse => 0x02,
                };
                let ia = match increment_axis {
                    IncrementAxis::Horizontal => 0x00,
                    IncrementAxis::Vertical => 0x04,
                };
                let csd = match com_scan_direction {
                    ComScanDirection::RowZeroFirst => 0x00,
                    ComScanDirection::RowZeroLast => 0x10,
                };
                let split = match com_layout {
                    ComLayout::Sequential => 0x00,
                    ComLayout::OddEvenSplit => 0x40,
                };
                ok_command!(buf, 0xA0, [cr | nr | ia | csd | split])
            }
            Command::SetStartLine(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(buf, 0xA1, [line]),
                _ => None,
            },
            Command::SetDisplayOffset(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(buf, 0xA2, [line]),
                _ => None,
            },
            Command::SetDisplayMode(mode) => ok_command!(
                buf,
                match mode {
                    DisplayMode::Normal => 0xA4,
                    DisplayMode::AllOn => 0xA5,
                    DisplayMode::AllOff => 0xA6,
                    DisplayMode::Inverse => 0xA7,
                },
                []
            ),
            Command::SetMuxRatio(ratio) => match ratio {
                16..=NUM_PIXEL_ROWS => ok_command!(buf, 0xA8, [ratio - 1]),
                _ => None,
            },
            Command::SetInternalRegulator(ena) => ok_command!(buf, 0xAB, [ena as u8]),
            Command::SetSleepMode(ena) => ok_command!(
                buf,
                match ena {
                    true => 0xAE,
                    false => 0xAF,
                },
                []
            ),
            Command::SetPhaseLengths(phase_1, phase_2) => match (phase_1, phase_2) {
                (1..=15, 1..=15) => ok_command!(buf, 0xB1, [phase_2 << 4 | phase_1]),
                _ => None,
            },
            Command::SetClockDivider(fosc, divide) => match (fosc, divide) {
                (0..=15, 0..=15) => ok_command!(buf, 0xB3, [fosc << 4 | divide]),
                _ => None,
            },
            Command::SetSecondPrechargePeriod(period) => match period {
                0..=15 => ok_command!(buf, 0xB6, [period]),
                _ => None,
            },
            Command::SetPrechargeVoltage(voltage) => match voltage {
                0..=15 => ok_command!(buf, 0xBC, [voltage]),
                _ => None,
            },
            Command::SetComDeselectVoltage(voltage) => match voltage {
                0..=15 => ok_command!(buf, 0xBE, [voltage]),
                _ => None,
            },
            Command::SetFunctionSelectionB(second_precharge, external_vsl) => {
                let sp = match second_precharge {
                    true => 0x02,
                    false => 0x00,
                };
                let vsl = match external_vsl {
                    true => 0x01,
                    false => 0x00,
                };
                ok_command!(buf, 0xD5, [0x60 | sp | vsl])
            }
            Command::SetCommandLock(ena) => {
                let e = match ena {
                    true => 0x16,
                    false => 0x12,
                };
                ok_command!(buf, 0xFD, [e])
            }
            Command::SetPageStart(page) => match page {
                0..=7 => ok_command!(buf, 0xB0 | page, []),
                _ => None,
            },
            Command::SetLowerColumnStart(nibble) => match nibble {
                0..=15 => ok_command!(buf, nibble, []),
                _ => None,
            },
            Command::SetHigherColumnStart(nibble) => match nibble {
                0..=15 => ok_command!(buf, 0x10 | nibble, []),
                _ => None,
            },
        }
    }

    /// Send this command as a transaction of its own.
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let mut arg_buf = [0u8; MAX_COMMAND_LEN];
        match self.encode(&mut arg_buf) {
            Some(bytes) => iface.send_commands(bytes).map_err(Error::Interface),
            None => Err(Error::OutOfRange),
        }
    }
}

/// Encode `cmds` back to back into one buffer, without touching any interface.
pub fn encode_sequence<E>(cmds: &[Command]) -> Result<Vec<u8, SEQUENCE_BUF_LEN>, Error<E>> {
    let mut seq = Vec::new();
    let mut arg_buf = [0u8; MAX_COMMAND_LEN];
    for cmd in cmds {
        let bytes = cmd.encode(&mut arg_buf).ok_or(Error::<E>::OutOfRange)?;
        seq.extend_from_slice(bytes)
            .map_err(|_| Error::BufferOverflow)?;
    }
    Ok(seq)
}

/// Send `cmds` back to back as a single command transaction. Nothing is sent if any command in
/// the sequence fails to encode.
pub fn send_sequence<DI>(cmds: &[Command], iface: &mut DI) -> Result<(), Error<DI::Error>>
where
    DI: DisplayInterface,
{
    let seq = encode_sequence::<DI::Error>(cmds)?;
    iface.send_commands(&seq).map_err(Error::Interface)
}
