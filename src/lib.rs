//! Driver library for the Solomon Systech SSD1327 128x128 grayscale OLED display controller,
//! connected over I2C.
//!
//! The driver renders a 1 bit per pixel framebuffer. Each refresh either resends the frame, or
//! (by default) compares it with a shadow copy of what the panel shows and sends only the changed
//! spans of each row, packed two pixels per byte.
//!
//! ```ignore
//! let iface = ssd1327::I2cInterface::new(i2c, ssd1327::DEFAULT_ADDRESS);
//! let mut disp = ssd1327::Display::new(iface, ssd1327::Geometry::default(), ssd1327::Config::default())?;
//! disp.connect()?;
//! disp.init()?;
//! disp.framebuffer_mut().set_pixel(10, 20, true);
//! disp.refresh()?;
//! ```
//!
//! # Crate Features
//!
//! - **`std`** *(default)*: implements `std::error::Error` for `Error`.
//! - **`defmt`**: debug logging of connect, init and refresh via `defmt`.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate embedded_hal as hal;
#[macro_use]
extern crate itertools;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod interface;

// Re-exports for primary API.
pub use command::{consts, Command, DisplayMode, INIT_SEQUENCE};
pub use config::{Config, RefreshMode, DEFAULT_CLOCK_RATE};
pub use display::{Display, FULL_FRAME_LEN};
pub use error::Error;
pub use framebuffer::{Framebuffer, Geometry};
pub use interface::i2c::{BusControl, I2cInterface, SharedBus, DEFAULT_ADDRESS};
pub use interface::DisplayInterface;
