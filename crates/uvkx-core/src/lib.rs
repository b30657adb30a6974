//! uvkx-core - Protocol and image codec for UV-Kx handheld radios
//!
//! This crate holds everything that does not touch a serial port: the
//! obfuscated, CRC-carrying frame format, the 8 KiB EEPROM image and the
//! codec that maps its packed records to channels and settings. It is
//! `no_std` so the same tables can be reused on embedded hosts.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```ignore
//! use uvkx_core::{decode_channel, LayoutVersion, RawImage};
//!
//! fn list(image: &RawImage) {
//!     let layout = image.detect_layout();
//!     for index in 1..=layout.chan_max() {
//!         if let Ok(Some(ch)) = decode_channel(image, index, layout) {
//!             println!("{:3} {:>12} {}", index, ch.rx_freq, ch.name);
//!         }
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod image;
pub mod layout;
pub mod protocol;
pub mod transfer;

pub use error::{Error, Result};
pub use image::RawImage;
pub use layout::channel::{clear_channel, decode_channel, encode_channel};
pub use layout::settings::{decode_settings, encode_settings};
pub use layout::{Channel, Duplex, LayoutVersion, Settings};
pub use transfer::{NoProgress, TransferProgress};
