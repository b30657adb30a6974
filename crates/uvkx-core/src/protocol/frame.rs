//! Frame encoding and decoding
//!
//! Wire format, in both directions:
//!
//! ```text
//! AB CD <len> 00 | xor(body ++ crc16_le) | DC BA
//! ```
//!
//! `<len>` counts the body only. The two CRC bytes sit in front of the
//! footer magic; the radio fills that slot with whatever it likes on replies,
//! so receivers ignore it.
//!
//! Everything here is a pure function over byte slices so the protocol can be
//! exercised without a serial port.

use core::fmt;

use heapless::{String, Vec};

use super::crc::crc16_xmodem;
use super::obfuscation::obfuscate_in_place;

/// Header magic bytes
pub const HEADER_MAGIC: [u8; 2] = [0xAB, 0xCD];
/// Footer magic bytes
pub const FOOTER_MAGIC: [u8; 2] = [0xDC, 0xBA];
/// Header length (magic, length, reserved)
pub const HEADER_LEN: usize = 4;
/// Footer length (CRC slot, magic)
pub const FOOTER_LEN: usize = 4;
/// Largest body the one-byte length field can describe
pub const MAX_BODY_LEN: usize = 0xFF;
/// Largest complete frame
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_BODY_LEN + FOOTER_LEN;

/// Constant tail appended to hello, read and write commands
pub const SESSION_TRAILER: [u8; 4] = [0x6A, 0x39, 0x57, 0x64];

/// Hello command opcode
pub const CMD_HELLO: u8 = 0x14;
/// Hello reply opcode
pub const REPLY_HELLO: u8 = 0x15;
/// Read-memory command opcode
pub const CMD_READ_MEM: u8 = 0x1B;
/// Read-memory reply opcode
pub const REPLY_READ_MEM: u8 = 0x1C;
/// Write-memory command opcode
pub const CMD_WRITE_MEM: u8 = 0x1D;
/// Write-memory acknowledgement opcode
pub const REPLY_WRITE_MEM: u8 = 0x1E;
/// Reset command opcode
pub const CMD_RESET: u8 = 0xDD;
/// Second byte of every command/reply opcode word
pub const OPCODE_HIGH: u8 = 0x05;

/// Number of leading reply bytes in front of read data
pub const READ_REPLY_HEADER_LEN: usize = 8;
/// Offset of the firmware string inside the hello reply
pub const FIRMWARE_OFFSET: usize = 4;
/// Maximum firmware string length
pub const FIRMWARE_MAX_LEN: usize = 18;

/// A frame body (unobfuscated, without CRC)
pub type Body = Vec<u8, MAX_BODY_LEN>;
/// A complete wire frame
pub type Frame = Vec<u8, MAX_FRAME_LEN>;
/// Firmware identification string
pub type FirmwareString = String<FIRMWARE_MAX_LEN>;

/// Part of a frame being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSection {
    /// Four-byte header
    Header,
    /// Obfuscated body
    Body,
    /// Four-byte footer
    Footer,
}

impl fmt::Display for FrameSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
            Self::Footer => write!(f, "footer"),
        }
    }
}

/// Framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Body does not fit the one-byte length field
    BodyTooLong {
        /// Requested body length
        len: usize,
    },
    /// Header magic or reserved byte mismatch
    BadHeader {
        /// Header bytes received
        found: [u8; HEADER_LEN],
    },
    /// Footer magic mismatch
    BadFooter {
        /// Footer bytes received
        found: [u8; FOOTER_LEN],
    },
    /// Fewer bytes than required were available
    ShortRead {
        /// Section being read
        section: FrameSection,
        /// Bytes required
        expected: usize,
        /// Bytes received
        actual: usize,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyTooLong { len } => {
                write!(f, "frame body of {} bytes exceeds {}", len, MAX_BODY_LEN)
            }
            Self::BadHeader { found } => write!(f, "bad frame header {:02X?}", found),
            Self::BadFooter { found } => write!(f, "bad frame footer {:02X?}", found),
            Self::ShortRead {
                section,
                expected,
                actual,
            } => write!(
                f,
                "{} short read: expected {} bytes, got {}",
                section, expected, actual
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// Wrap a body into a complete obfuscated frame with CRC
pub fn encode_frame(body: &[u8]) -> Result<Frame, FrameError> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLong { len: body.len() });
    }

    let crc = crc16_xmodem(body);

    let mut frame = Frame::new();
    // Capacity is checked above, pushes below cannot fail
    let _ = frame.extend_from_slice(&HEADER_MAGIC);
    let _ = frame.push(body.len() as u8);
    let _ = frame.push(0);
    let _ = frame.extend_from_slice(body);
    let _ = frame.extend_from_slice(&crc.to_le_bytes());
    obfuscate_in_place(&mut frame[HEADER_LEN..]);
    let _ = frame.extend_from_slice(&FOOTER_MAGIC);

    Ok(frame)
}

/// Validate a header and return the declared body length
pub fn parse_header(header: &[u8]) -> Result<usize, FrameError> {
    if header.len() != HEADER_LEN {
        return Err(FrameError::ShortRead {
            section: FrameSection::Header,
            expected: HEADER_LEN,
            actual: header.len(),
        });
    }
    if header[..2] != HEADER_MAGIC || header[3] != 0 {
        let mut found = [0u8; HEADER_LEN];
        found.copy_from_slice(header);
        return Err(FrameError::BadHeader { found });
    }
    Ok(header[2] as usize)
}

/// Validate a footer
///
/// Only the magic is checked; the two leading bytes are the unverified CRC slot.
pub fn check_footer(footer: &[u8]) -> Result<(), FrameError> {
    if footer.len() != FOOTER_LEN {
        return Err(FrameError::ShortRead {
            section: FrameSection::Footer,
            expected: FOOTER_LEN,
            actual: footer.len(),
        });
    }
    if footer[2..] != FOOTER_MAGIC {
        let mut found = [0u8; FOOTER_LEN];
        found.copy_from_slice(footer);
        return Err(FrameError::BadFooter { found });
    }
    Ok(())
}

/// A frame taken apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// De-obfuscated body
    pub body: Body,
    /// De-obfuscated value found in the CRC slot
    pub crc: u16,
}

impl DecodedFrame {
    /// Whether the CRC slot holds the CRC of the body
    pub fn crc_valid(&self) -> bool {
        crc16_xmodem(&self.body) == self.crc
    }
}

/// Decode a complete frame held in memory
pub fn decode_frame(frame: &[u8]) -> Result<DecodedFrame, FrameError> {
    let header = frame.get(..HEADER_LEN).unwrap_or(frame);
    let len = parse_header(header)?;

    let payload_end = HEADER_LEN + len + 2;
    if frame.len() < payload_end {
        return Err(FrameError::ShortRead {
            section: FrameSection::Body,
            expected: len,
            actual: frame.len().saturating_sub(HEADER_LEN).min(len),
        });
    }
    let footer_start = HEADER_LEN + len;
    let footer = frame
        .get(footer_start..footer_start + FOOTER_LEN)
        .unwrap_or(&frame[footer_start..]);
    check_footer(footer)?;

    let mut payload: Vec<u8, { MAX_BODY_LEN + 2 }> = Vec::new();
    let _ = payload.extend_from_slice(&frame[HEADER_LEN..payload_end]);
    obfuscate_in_place(&mut payload);

    let mut body = Body::new();
    let _ = body.extend_from_slice(&payload[..len]);
    let crc = u16::from_le_bytes([payload[len], payload[len + 1]]);

    Ok(DecodedFrame { body, crc })
}

/// Total frame length implied by a valid header
pub fn frame_len(body_len: usize) -> usize {
    HEADER_LEN + body_len + FOOTER_LEN
}

// =============================================================================
// Command bodies
// =============================================================================

/// Hello (handshake) command body
pub fn hello_body() -> [u8; 8] {
    let mut body = [CMD_HELLO, OPCODE_HIGH, 0x04, 0x00, 0, 0, 0, 0];
    body[4..].copy_from_slice(&SESSION_TRAILER);
    body
}

/// Read-memory command body
pub fn read_body(offset: u16, len: u8) -> [u8; 12] {
    let off = offset.to_le_bytes();
    let mut body = [CMD_READ_MEM, OPCODE_HIGH, 0x08, 0x00, off[0], off[1], len, 0, 0, 0, 0, 0];
    body[8..].copy_from_slice(&SESSION_TRAILER);
    body
}

/// Write-memory command body
pub fn write_body(offset: u16, data: &[u8]) -> Result<Body, FrameError> {
    const PREFIX_LEN: usize = 12;
    if data.len() + PREFIX_LEN > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLong {
            len: data.len() + PREFIX_LEN,
        });
    }
    let off = offset.to_le_bytes();
    let dlen = data.len() as u8;

    let mut body = Body::new();
    let _ = body.extend_from_slice(&[
        CMD_WRITE_MEM,
        OPCODE_HIGH,
        dlen + 8,
        0,
        off[0],
        off[1],
        dlen,
        1,
    ]);
    let _ = body.extend_from_slice(&SESSION_TRAILER);
    let _ = body.extend_from_slice(data);
    Ok(body)
}

/// Reset command body
pub fn reset_body() -> [u8; 4] {
    [CMD_RESET, OPCODE_HIGH, 0x00, 0x00]
}

// =============================================================================
// Reply helpers
// =============================================================================

/// Data bytes carried by a read-memory reply
pub fn read_reply_data(reply: &[u8]) -> &[u8] {
    reply.get(READ_REPLY_HEADER_LEN..).unwrap_or(&[])
}

/// Offset echoed in a write acknowledgement, if the reply is long enough
pub fn write_ack_offset(reply: &[u8]) -> Option<u16> {
    match reply {
        [_, _, _, _, lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Whether a reply acknowledges a write at `offset`
pub fn is_write_ack(reply: &[u8], offset: u16) -> bool {
    reply.first() == Some(&REPLY_WRITE_MEM) && write_ack_offset(reply) == Some(offset)
}

/// Extract the printable firmware string from a hello reply
///
/// Starts at byte 4, stops at the first byte outside `0x20..=0x7E` or after
/// [`FIRMWARE_MAX_LEN`] bytes.
pub fn firmware_string(reply: &[u8]) -> FirmwareString {
    let mut s = FirmwareString::new();
    let tail = reply.get(FIRMWARE_OFFSET..).unwrap_or(&[]);
    for &b in tail.iter().take(FIRMWARE_MAX_LEN) {
        if !(0x20..=0x7E).contains(&b) {
            break;
        }
        let _ = s.push(b as char);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_layout() {
        let body = hello_body();
        let frame = encode_frame(&body).unwrap();

        assert_eq!(frame.len(), 4 + 8 + 2 + 2);
        assert_eq!(&frame[..4], &[0xAB, 0xCD, 0x08, 0x00]);
        assert_eq!(&frame[frame.len() - 2..], &FOOTER_MAGIC);

        // First payload byte is the opcode XOR the first key byte
        assert_eq!(frame[4], CMD_HELLO ^ 0x16);
    }

    #[test]
    fn test_decode_frame_recovers_body_and_crc() {
        let body = read_body(0x1F80, 0x80);
        let frame = encode_frame(&body).unwrap();
        let decoded = decode_frame(&frame).unwrap();

        assert_eq!(decoded.body.as_slice(), &body);
        assert_eq!(decoded.crc, crc16_xmodem(&body));
        assert!(decoded.crc_valid());
    }

    #[test]
    fn test_parse_header_rejects_bad_magic() {
        assert_eq!(parse_header(&[0xAB, 0xCD, 0x10, 0x00]), Ok(0x10));
        assert!(matches!(
            parse_header(&[0xAB, 0xCE, 0x10, 0x00]),
            Err(FrameError::BadHeader { .. })
        ));
        assert!(matches!(
            parse_header(&[0xAB, 0xCD, 0x10, 0x01]),
            Err(FrameError::BadHeader { .. })
        ));
        assert!(matches!(
            parse_header(&[0xAB, 0xCD]),
            Err(FrameError::ShortRead {
                section: FrameSection::Header,
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_check_footer_ignores_crc_slot() {
        assert!(check_footer(&[0x12, 0x34, 0xDC, 0xBA]).is_ok());
        assert!(matches!(
            check_footer(&[0x00, 0x00, 0xBA, 0xDC]),
            Err(FrameError::BadFooter { .. })
        ));
    }

    #[test]
    fn test_decode_frame_short() {
        let frame = encode_frame(&hello_body()).unwrap();
        assert!(matches!(
            decode_frame(&frame[..8]),
            Err(FrameError::ShortRead {
                section: FrameSection::Body,
                ..
            })
        ));
    }

    #[test]
    fn test_body_too_long() {
        let big = [0u8; 256];
        assert_eq!(
            encode_frame(&big),
            Err(FrameError::BodyTooLong { len: 256 })
        );
        assert!(write_body(0, &[0u8; 250]).is_err());
    }

    #[test]
    fn test_read_body() {
        let body = read_body(0x0180, 0x80);
        assert_eq!(
            body,
            [0x1B, 0x05, 0x08, 0x00, 0x80, 0x01, 0x80, 0x00, 0x6A, 0x39, 0x57, 0x64]
        );
    }

    #[test]
    fn test_write_body() {
        let body = write_body(0x0500, &[0xAA, 0xBB]).unwrap();
        assert_eq!(
            body.as_slice(),
            &[0x1D, 0x05, 0x0A, 0x00, 0x00, 0x05, 0x02, 0x01, 0x6A, 0x39, 0x57, 0x64, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_write_ack() {
        let ack = [REPLY_WRITE_MEM, 0x05, 0x02, 0x00, 0x80, 0x1F];
        assert!(is_write_ack(&ack, 0x1F80));
        assert!(!is_write_ack(&ack, 0x1F00));
        assert!(!is_write_ack(&[0x1F, 0x05, 0x02, 0x00, 0x80, 0x1F], 0x1F80));
        assert!(!is_write_ack(&[REPLY_WRITE_MEM, 0x05], 0));
    }

    #[test]
    fn test_firmware_string() {
        let mut reply = [0u8; 24];
        reply[..4].copy_from_slice(&[REPLY_HELLO, 0x05, 0x14, 0x00]);
        reply[4..12].copy_from_slice(b"UVKX v1\x00");
        assert_eq!(firmware_string(&reply).as_str(), "UVKX v1");

        // Capped at 18 characters
        let mut long = [b'A'; 30];
        long[..4].copy_from_slice(&[REPLY_HELLO, 0x05, 0x1A, 0x00]);
        assert_eq!(firmware_string(&long).len(), FIRMWARE_MAX_LEN);

        // Non-printable first byte yields nothing
        assert!(firmware_string(&[REPLY_HELLO, 0x05, 0x00, 0x00, 0x01, b'A']).is_empty());
        assert!(firmware_string(&[REPLY_HELLO]).is_empty());
    }

    #[test]
    fn test_read_reply_data() {
        let mut reply = [0u8; 12];
        reply[8..].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(read_reply_data(&reply), &[1, 2, 3, 4]);
        assert!(read_reply_data(&reply[..5]).is_empty());
    }
}
