//! CRC-16/XMODEM
//!
//! Appended to every outbound command before obfuscation. The radio never
//! checks it and never sends a meaningful one back, so it is computed on the
//! way out only.

const POLY: u16 = 0x1021;

/// Compute CRC-16/XMODEM (poly 0x1021, init 0, MSB first, no final XOR)
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
