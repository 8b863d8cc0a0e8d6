//! Error type shared by the command, display and refresh layers.

use core::fmt;

/// Errors returned by the driver. `E` is the error type of the `DisplayInterface` in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A bus transaction failed.
    Interface(E),
    /// A command operand was outside the range the controller accepts.
    OutOfRange,
    /// The display geometry cannot be driven in the requested refresh mode.
    UnsupportedGeometry,
    /// A command sequence did not fit in the sequencing buffer.
    BufferOverflow,
    /// A refresh was requested before `Display::init` succeeded.
    NotInitialized,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "display interface error: {:?}", e),
            Error::OutOfRange => write!(f, "command operand out of range"),
            Error::UnsupportedGeometry => write!(f, "display geometry not supported"),
            Error::BufferOverflow => write!(f, "command sequence too long"),
            Error::NotInitialized => write!(f, "display not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
