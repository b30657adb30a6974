//! UV-Kx serial programming protocol
//!
//! Leaf components of the link: the XOR obfuscation, the CRC appended to
//! outbound commands, and frame encode/decode. None of this performs I/O.

pub mod crc;
pub mod frame;
pub mod obfuscation;

pub use crc::crc16_xmodem;
pub use frame::{
    decode_frame, encode_frame, firmware_string, Body, DecodedFrame, FirmwareString, Frame,
    FrameError, FrameSection,
};
pub use obfuscation::{obfuscate, obfuscate_in_place, OBFUSCATION_KEY};
