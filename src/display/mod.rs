//! The main API to the display driver. It owns the framebuffer, sequences the controller
//! initialization, and transfers the framebuffer to the panel with the configured refresh mode.

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
pub mod testing {
    macro_rules! cmd {
        ($($b:expr),* $(,)*) => {Sent::Cmd(vec![$($b,)*])};
    }
    macro_rules! data {
        ($($b:expr),* $(,)*) => {Sent::Data(vec![$($b,)*])};
    }
}

mod delta;
mod full_frame;

pub use self::full_frame::FULL_FRAME_LEN;

use crate::command::*;
use crate::config::{Config, RefreshMode};
use crate::display::delta::Delta;
use crate::display::full_frame::FullFrame;
use crate::error::Error;
use crate::framebuffer::{Framebuffer, Geometry};
use crate::interface;

/// The refresh strategy chosen by `Config::refresh_mode`.
enum Encoder {
    FullFrame(FullFrame),
    Delta(Delta),
}

impl Encoder {
    fn refresh<DI>(&mut self, iface: &mut DI, fb: &Framebuffer) -> Result<usize, Error<DI::Error>>
    where
        DI: interface::DisplayInterface,
    {
        match self {
            Encoder::FullFrame(enc) => enc.refresh(iface, fb),
            Encoder::Delta(enc) => enc.refresh(iface, fb),
        }
    }
}

/// A driver for an SSD1327 display.
pub struct Display<DI>
where
    DI: interface::DisplayInterface,
{
    iface: DI,
    config: Config,
    framebuffer: Framebuffer,
    encoder: Encoder,
    initialized: bool,
}

impl<DI> Display<DI>
where
    DI: interface::DisplayInterface,
{
    /// Construct a new display driver for a display with viewable dimensions `geometry`, which is
    /// connected to the interface `iface`. No bus traffic is generated.
    ///
    /// Full-frame refresh always sends 1024 framebuffer bytes, so it needs a geometry of at least
    /// 8192 pixels and returns `Error::UnsupportedGeometry` otherwise.
    pub fn new(iface: DI, geometry: Geometry, config: Config) -> Result<Self, Error<DI::Error>> {
        let encoder = match config.refresh_mode {
            RefreshMode::FullFrame if geometry.buffer_len() < FULL_FRAME_LEN => {
                return Err(Error::UnsupportedGeometry);
            }
            RefreshMode::FullFrame => Encoder::FullFrame(FullFrame),
            RefreshMode::Delta => Encoder::Delta(Delta::new(geometry)),
        };
        Ok(Display {
            iface,
            config,
            framebuffer: Framebuffer::new(geometry),
            encoder,
            initialized: false,
        })
    }

    /// Prepare the bus. If the driver is configured to own the bus it is brought up, and a
    /// configured clock rate is applied.
    pub fn connect(&mut self) -> Result<(), Error<DI::Error>> {
        if self.config.bus_auto_init {
            self.iface.begin_bus().map_err(Error::Interface)?;
        }
        if let Some(hz) = self.config.clock_rate {
            self.iface.set_clock_rate(hz).map_err(Error::Interface)?;
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1327: connected, clock {}", self.config.clock_rate);
        Ok(())
    }

    /// Initialize the controller with the fixed power-on sequence, leaving the display on and
    /// ready for `refresh`. Must succeed before the first refresh.
    pub fn init(&mut self) -> Result<(), Error<DI::Error>> {
        self.initialized = false;
        send_sequence(&INIT_SEQUENCE, &mut self.iface)?;
        if let Encoder::Delta(enc) = &mut self.encoder {
            enc.invalidate();
        }
        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1327: initialized, {}", self.config.refresh_mode);
        Ok(())
    }

    /// Transfer the framebuffer to the panel, returning the number of pixel data bytes sent.
    ///
    /// On a bus error the refresh stops at the failed transaction. In delta mode the panel's
    /// content is then unknown, so the next refresh sends the whole frame.
    pub fn refresh(&mut self) -> Result<usize, Error<DI::Error>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if self.config.bus_auto_init {
            self.iface.begin_bus().map_err(Error::Interface)?;
        }
        let sent = self.encoder.refresh(&mut self.iface, &self.framebuffer)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1327: refresh sent {} data bytes", sent);
        Ok(sent)
    }

    /// Control sleep mode. The panel is dark while asleep; display RAM is retained.
    pub fn sleep(&mut self, enabled: bool) -> Result<(), Error<DI::Error>> {
        Command::SetSleepMode(enabled).send(&mut self.iface)
    }

    /// Set the contrast current.
    pub fn contrast(&mut self, current: u8) -> Result<(), Error<DI::Error>> {
        Command::SetContrastCurrent(current).send(&mut self.iface)
    }

    /// Show the image with intensities inverted, or normally.
    pub fn invert(&mut self, inverted: bool) -> Result<(), Error<DI::Error>> {
        let mode = match inverted {
            true => DisplayMode::Inverse,
            false => DisplayMode::Normal,
        };
        Command::SetDisplayMode(mode).send(&mut self.iface)
    }

    pub fn geometry(&self) -> Geometry {
        self.framebuffer.geometry()
    }

    /// The framebuffer `refresh` sends from.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// What the driver believes the panel shows, in delta mode.
    pub fn shadow(&self) -> Option<&Framebuffer> {
        match &self.encoder {
            Encoder::FullFrame(_) => None,
            Encoder::Delta(enc) => Some(enc.shadow()),
        }
    }

    /// Consume the driver and give back its interface.
    pub fn release(self) -> DI {
        self.iface
    }
}
