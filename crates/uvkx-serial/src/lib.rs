//! uvkx-serial - Serial programming of UV-Kx radios
//!
//! This crate drives the radio's programming protocol over a serial
//! link. [`Radio`] wraps a [`Transport`] and provides the handshake, block
//! read, block write and reset primitives; [`download`] and [`upload`]
//! move whole EEPROM images.
//!
//! # Example
//!
//! ```no_run
//! use uvkx_core::NoProgress;
//! use uvkx_serial::{download, Radio, SerialTransport};
//!
//! let transport = SerialTransport::open("/dev/ttyUSB0", None)?;
//! let mut radio = Radio::new(transport);
//! let image = download(&mut radio, &mut NoProgress)?;
//! std::fs::write("radio.img", image.as_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod device;
pub mod error;
pub mod transfer;
pub mod transport;

pub use device::Radio;
pub use error::{InitFailure, RadioError, Result};
pub use transfer::{download, upload, UploadOptions};
pub use transport::{SerialTransport, Transport, DEFAULT_BAUD, DEFAULT_TIMEOUT};

/// Serial connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConnection {
    /// Device path (e.g. "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Baud rate (None for the default)
    pub baud: Option<u32>,
}

impl SerialConnection {
    /// Parse a connection string
    ///
    /// Formats:
    /// - `/dev/ttyUSB0` - Serial with default baud
    /// - `dev=/dev/ttyUSB0` - Same
    /// - `dev=/dev/ttyUSB0:38400` - Serial with specified baud
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(dev) = s.strip_prefix("dev=") else {
            if s.is_empty() {
                return Err(RadioError::InvalidConnection("empty port name".into()));
            }
            return Ok(Self {
                device: s.to_string(),
                baud: None,
            });
        };

        match dev.rsplit_once(':') {
            Some((device, baud_str)) if !device.is_empty() => {
                let baud = baud_str.parse().map_err(|_| {
                    RadioError::InvalidConnection(format!("invalid baud rate: {}", baud_str))
                })?;
                Ok(Self {
                    device: device.to_string(),
                    baud: Some(baud),
                })
            }
            _ if dev.is_empty() => Err(RadioError::InvalidConnection(
                "missing device after dev=".into(),
            )),
            _ => Ok(Self {
                device: dev.to_string(),
                baud: None,
            }),
        }
    }

    /// Open the port
    pub fn open(&self) -> Result<SerialTransport> {
        SerialTransport::open(&self.device, self.baud)
    }
}
