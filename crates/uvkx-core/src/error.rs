//! Error types for uvkx-core
//!
//! no_std compatible error type for the image codec. Framing errors have
//! their own type in [`crate::protocol::frame`].

use core::fmt;

/// Core error type - no_std compatible, Copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Channel index outside `[1, max]`
    InvalidLocation {
        /// Requested index
        index: u16,
        /// Highest valid index for the layout
        max: u16,
    },
    /// CTCSS tone (tenths of Hz) not in the tone table
    UnsupportedTone {
        /// Tone in tenths of Hz
        tenths: u16,
    },
    /// DTCS code not in the code table
    UnsupportedDtcs {
        /// Code as written (octal digits, e.g. 754)
        code: u16,
    },
    /// Fixed RX AGC gain not in the gain table
    UnsupportedAgcGain {
        /// Gain in dB
        db: i8,
    },
    /// Value rejected by a domain rule
    Validation(&'static str),
    /// Raw image of the wrong size
    ImageSize {
        /// Required size
        expected: usize,
        /// Size provided
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLocation { index, max } => {
                write!(f, "channel {} out of range (1-{})", index, max)
            }
            Self::UnsupportedTone { tenths } => {
                write!(f, "unsupported CTCSS tone {}.{} Hz", tenths / 10, tenths % 10)
            }
            Self::UnsupportedDtcs { code } => write!(f, "unsupported DTCS code {:03}", code),
            Self::UnsupportedAgcGain { db } => write!(f, "unsupported RX AGC gain {} dB", db),
            Self::Validation(msg) => write!(f, "invalid value: {}", msg),
            Self::ImageSize { expected, actual } => write!(
                f,
                "image is {} bytes, expected {} bytes",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
