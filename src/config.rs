//! Defines the driver configuration: how frames are transferred, and how much of the bus the
//! driver is responsible for.

/// The I2C clock rate applied by `Display::connect` unless configured otherwise. Fast-mode
/// masters which cannot reach it will clamp to their own maximum.
pub const DEFAULT_CLOCK_RATE: u32 = 700_000;

/// How `Display::refresh` transfers the framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshMode {
    /// Send the first eight pages of the framebuffer verbatim on every refresh, using page
    /// addressing. No shadow buffer is kept.
    FullFrame,
    /// Keep a shadow copy of what the panel shows and send only the rows and column pairs which
    /// changed since the last refresh, nibble-packed.
    Delta,
}

/// A configuration for the driver. Builder methods offer a declarative way to change the
/// defaults, which are delta refresh, a 700kHz bus clock, and a bus that someone else brings up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) refresh_mode: RefreshMode,
    pub(crate) clock_rate: Option<u32>,
    pub(crate) bus_auto_init: bool,
}

impl Config {
    /// Create a new configuration using `refresh_mode`. The refresh mode is fixed for the life of
    /// the `Display`, because delta mode needs a shadow buffer allocated alongside it.
    pub fn new(refresh_mode: RefreshMode) -> Self {
        Config {
            refresh_mode,
            clock_rate: Some(DEFAULT_CLOCK_RATE),
            bus_auto_init: false,
        }
    }

    /// Extend this `Config` to set the bus clock to `hz` on `Display::connect`.
    pub fn clock_rate(self, hz: u32) -> Self {
        Self {
            clock_rate: Some(hz),
            ..self
        }
    }

    /// Extend this `Config` to leave the bus clock as it is, for buses shared with other devices.
    pub fn keep_clock_rate(self) -> Self {
        Self {
            clock_rate: None,
            ..self
        }
    }

    /// Extend this `Config` so the driver brings the bus up itself: once on `Display::connect`,
    /// and again before every refresh.
    pub fn bus_auto_init(self, enabled: bool) -> Self {
        Self {
            bus_auto_init: enabled,
            ..self
        }
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh_mode
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(RefreshMode::Delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh_mode(), RefreshMode::Delta);
        assert_eq!(cfg.clock_rate, Some(DEFAULT_CLOCK_RATE));
        assert!(!cfg.bus_auto_init);
    }

    #[test]
    fn builder() {
        let cfg = Config::new(RefreshMode::FullFrame)
            .clock_rate(400_000)
            .bus_auto_init(true);
        assert_eq!(cfg.refresh_mode(), RefreshMode::FullFrame);
        assert_eq!(cfg.clock_rate, Some(400_000));
        assert!(cfg.bus_auto_init);

        let cfg = cfg.keep_clock_rate();
        assert_eq!(cfg.clock_rate, None);
    }
}
