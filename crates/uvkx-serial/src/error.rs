//! Error types for radio sessions

use thiserror::Error;
use uvkx_core::protocol::FrameError;

/// Why the handshake did not produce a firmware string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFailure {
    /// Every hello was answered with an empty body
    NoReply {
        /// Hello attempts made
        attempts: u32,
    },
    /// The hello reply carried no printable firmware string
    EmptyFirmware,
}

impl std::fmt::Display for InitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoReply { attempts } => write!(f, "no reply after {} attempts", attempts),
            Self::EmptyFirmware => write!(f, "empty firmware string"),
        }
    }
}

/// Radio communication errors
#[derive(Debug, Error)]
pub enum RadioError {
    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Read or write on the link failed
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Malformed frame on the link
    #[error("Framing error: {0}")]
    Framing(#[from] FrameError),

    /// The radio answered with something other than the expected reply
    #[error("Protocol error at 0x{offset:04X}: {detail}")]
    Protocol {
        /// Block offset of the failing command
        offset: u16,
        /// What was wrong
        detail: String,
    },

    /// Handshake failed
    #[error("Radio initialization failed: {0}")]
    Initialization(InitFailure),

    /// A block came back short or empty
    #[error("Incomplete transfer at 0x{offset:04X}: expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        /// Block offset
        offset: usize,
        /// Bytes requested
        expected: usize,
        /// Bytes received
        actual: usize,
    },

    /// Invalid connection string
    #[error("Invalid connection string: {0}")]
    InvalidConnection(String),

    /// Image codec error
    #[error(transparent)]
    Codec(#[from] uvkx_core::Error),
}

/// Result type for radio operations
pub type Result<T> = std::result::Result<T, RadioError>;
