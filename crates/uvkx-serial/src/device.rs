//! Radio session
//!
//! `Radio` owns the transport and implements the request/reply primitives of
//! the programming protocol. Every command gets exactly one framed reply,
//! except reset which gets none.

use std::time::Duration;

use uvkx_core::layout::BLOCK_SIZE;
use uvkx_core::protocol::frame::{
    self, check_footer, encode_frame, parse_header, Body, FirmwareString, FrameError,
    FrameSection, FOOTER_LEN, HEADER_LEN, REPLY_WRITE_MEM,
};
use uvkx_core::protocol::obfuscate_in_place;

use crate::error::{InitFailure, RadioError, Result};
use crate::transport::Transport;

/// Hello attempts before giving up
pub const HANDSHAKE_ATTEMPTS: u32 = 5;

/// Format bytes as space-separated hex for logging
pub(crate) fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A programming session with one radio
pub struct Radio<T: Transport> {
    transport: T,
    firmware: Option<FirmwareString>,
}

impl<T: Transport> Radio<T> {
    /// Wrap a transport; no bytes are exchanged until [`Radio::handshake`]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            firmware: None,
        }
    }

    /// Set the per-read timeout
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.transport.set_timeout(timeout)
    }

    /// Firmware string from the last successful handshake
    pub fn firmware(&self) -> Option<&str> {
        self.firmware.as_deref()
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Frame and send a command body
    pub fn send_command(&mut self, body: &[u8]) -> Result<()> {
        log::debug!("> {}", hex(body));
        let frame = encode_frame(body)?;
        self.transport.write(&frame)
    }

    fn read_section(&mut self, buf: &mut [u8], section: FrameSection) -> Result<()> {
        let n = self.transport.read(buf)?;
        if n != buf.len() {
            log::warn!(
                "Short {} read: expected {} bytes, got {}",
                section,
                buf.len(),
                n
            );
            return Err(FrameError::ShortRead {
                section,
                expected: buf.len(),
                actual: n,
            }
            .into());
        }
        Ok(())
    }

    /// Read one framed reply and return its de-obfuscated body
    ///
    /// The CRC slot in the footer is not checked; the radio does not fill it
    /// reliably.
    pub fn receive_reply(&mut self) -> Result<Body> {
        let mut header = [0u8; HEADER_LEN];
        self.read_section(&mut header, FrameSection::Header)?;
        let len = parse_header(&header).inspect_err(|e| log::warn!("{}", e))?;

        let mut body = Body::new();
        // len came from a single byte, always within capacity
        let _ = body.resize(len, 0);
        self.read_section(&mut body, FrameSection::Body)?;

        let mut footer = [0u8; FOOTER_LEN];
        self.read_section(&mut footer, FrameSection::Footer)?;
        check_footer(&footer).inspect_err(|e| log::warn!("{}", e))?;

        obfuscate_in_place(&mut body);
        log::debug!("< {}", hex(&body));
        Ok(body)
    }

    fn command(&mut self, body: &[u8]) -> Result<Body> {
        self.send_command(body)?;
        self.receive_reply()
    }

    /// Exchange hellos until the radio answers, returning its firmware string
    ///
    /// Only empty replies are retried. Framing and transport errors end the
    /// handshake immediately.
    pub fn handshake(&mut self) -> Result<FirmwareString> {
        self.firmware = None;
        for attempt in 1..=HANDSHAKE_ATTEMPTS {
            let reply = self.command(&frame::hello_body())?;
            if reply.is_empty() {
                log::debug!("Empty hello reply (attempt {})", attempt);
                continue;
            }

            let firmware = frame::firmware_string(&reply);
            if firmware.is_empty() {
                log::warn!("Hello reply carries no firmware string");
                return Err(RadioError::Initialization(InitFailure::EmptyFirmware));
            }
            log::info!("Radio firmware: {}", firmware);
            self.firmware = Some(firmware.clone());
            return Ok(firmware);
        }

        log::warn!("No hello reply after {} attempts", HANDSHAKE_ATTEMPTS);
        Err(RadioError::Initialization(InitFailure::NoReply {
            attempts: HANDSHAKE_ATTEMPTS,
        }))
    }

    /// Read `len` bytes of EEPROM at `offset`
    pub fn read_block(&mut self, offset: u16, len: u8) -> Result<Vec<u8>> {
        let reply = self.command(&frame::read_body(offset, len))?;
        let data = frame::read_reply_data(&reply);
        if data.len() != len as usize {
            log::warn!(
                "Read at 0x{:04X} returned {} bytes, expected {}",
                offset,
                data.len(),
                len
            );
            return Err(RadioError::IncompleteTransfer {
                offset: offset as usize,
                expected: len as usize,
                actual: data.len(),
            });
        }
        Ok(data.to_vec())
    }

    /// Write `data` to EEPROM at `offset` and check the acknowledgement
    pub fn write_block(&mut self, offset: u16, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > BLOCK_SIZE {
            let err = uvkx_core::Error::Validation("write block must be 1 to 128 bytes");
            return Err(err.into());
        }

        let body = frame::write_body(offset, data)?;
        let reply = self.command(&body)?;
        if !frame::is_write_ack(&reply, offset) {
            let detail = match (reply.first(), frame::write_ack_offset(&reply)) {
                (Some(&op), _) if op != REPLY_WRITE_MEM => {
                    format!("expected ack 0x{:02X}, got 0x{:02X}", REPLY_WRITE_MEM, op)
                }
                (_, Some(echo)) => format!("ack echoes offset 0x{:04X}", echo),
                _ => format!("ack too short ({} bytes)", reply.len()),
            };
            log::warn!("Write at 0x{:04X} rejected: {}", offset, detail);
            return Err(RadioError::Protocol { offset, detail });
        }
        Ok(())
    }

    /// Ask the radio to reboot; no reply is read
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("Resetting radio");
        self.send_command(&frame::reset_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use uvkx_core::protocol::{obfuscate, FrameError};

    /// Replays canned inbound bytes and records everything written
    #[derive(Default)]
    struct Scripted {
        inbound: VecDeque<u8>,
        written: Vec<Vec<u8>>,
    }

    impl Scripted {
        fn queue(&mut self, bytes: &[u8]) {
            self.inbound.extend(bytes.iter().copied());
        }

        fn queue_reply(&mut self, body: &[u8]) {
            let mut payload = body.to_vec();
            payload.extend_from_slice(&[0, 0]);
            let mut scrambled = vec![0u8; payload.len()];
            obfuscate(&payload, &mut scrambled);
            self.queue(&[0xAB, 0xCD, body.len() as u8, 0x00]);
            self.queue(&scrambled[..body.len()]);
            self.queue(&[scrambled[body.len()], scrambled[body.len() + 1], 0xDC, 0xBA]);
        }
    }

    impl Transport for Scripted {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.written.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let mut n = 0;
            while n < buf.len() {
                match self.inbound.pop_front() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }

        fn set_timeout(&mut self, _timeout: Duration) -> Result<()> {
            Ok(())
        }
    }

    fn hello_reply(fw: &[u8]) -> Vec<u8> {
        let mut body = vec![0x15, 0x05, 0x00, 0x00];
        body.extend_from_slice(fw);
        body
    }

    #[test]
    fn test_send_command_frames_body() {
        let mut radio = Radio::new(Scripted::default());
        radio.send_command(&frame::reset_body()).unwrap();

        let sent = &radio.transport().written[0];
        assert_eq!(&sent[..4], &[0xAB, 0xCD, 0x04, 0x00]);
        assert_eq!(sent.len(), 4 + 4 + 2 + 2);
        assert_eq!(&sent[sent.len() - 2..], &[0xDC, 0xBA]);
    }

    #[test]
    fn test_receive_reply_deobfuscates() {
        let mut t = Scripted::default();
        t.queue_reply(&[0x1E, 0x05, 0x02, 0x00, 0x80, 0x00]);
        let mut radio = Radio::new(t);
        assert_eq!(
            radio.receive_reply().unwrap().as_slice(),
            &[0x1E, 0x05, 0x02, 0x00, 0x80, 0x00]
        );
    }

    #[test]
    fn test_receive_reply_short_header() {
        let mut t = Scripted::default();
        t.queue(&[0xAB, 0xCD]);
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.receive_reply(),
            Err(RadioError::Framing(FrameError::ShortRead {
                section: FrameSection::Header,
                expected: 4,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_receive_reply_bad_magic() {
        let mut t = Scripted::default();
        t.queue(&[0xAA, 0xCD, 0x00, 0x00]);
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.receive_reply(),
            Err(RadioError::Framing(FrameError::BadHeader { .. }))
        ));

        let mut t = Scripted::default();
        t.queue(&[0xAB, 0xCD, 0x01, 0x00, 0x55, 0x00, 0x00, 0xBA, 0xDC]);
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.receive_reply(),
            Err(RadioError::Framing(FrameError::BadFooter { .. }))
        ));
    }

    #[test]
    fn test_receive_reply_short_body() {
        let mut t = Scripted::default();
        t.queue(&[0xAB, 0xCD, 0x10, 0x00, 0x01, 0x02]);
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.receive_reply(),
            Err(RadioError::Framing(FrameError::ShortRead {
                section: FrameSection::Body,
                expected: 16,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_handshake_retries_empty_replies() {
        let mut t = Scripted::default();
        t.queue_reply(&[]);
        t.queue_reply(&[]);
        t.queue_reply(&hello_reply(b"2.01.32\0\0"));
        let mut radio = Radio::new(t);

        assert_eq!(radio.handshake().unwrap().as_str(), "2.01.32");
        assert_eq!(radio.firmware(), Some("2.01.32"));
        assert_eq!(radio.transport().written.len(), 3);
    }

    #[test]
    fn test_handshake_gives_up() {
        let mut t = Scripted::default();
        for _ in 0..HANDSHAKE_ATTEMPTS {
            t.queue_reply(&[]);
        }
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.handshake(),
            Err(RadioError::Initialization(InitFailure::NoReply { attempts: 5 }))
        ));
        assert_eq!(radio.transport().written.len(), 5);
        assert_eq!(radio.firmware(), None);
    }

    #[test]
    fn test_handshake_empty_firmware() {
        let mut t = Scripted::default();
        t.queue_reply(&hello_reply(&[0x01, 0x41]));
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.handshake(),
            Err(RadioError::Initialization(InitFailure::EmptyFirmware))
        ));
    }

    #[test]
    fn test_read_block_checks_length() {
        let mut t = Scripted::default();
        let mut reply = vec![0x1C, 0x05, 0x84, 0x00, 0x00, 0x00, 0x80, 0x00];
        reply.extend_from_slice(&[0x11; 0x40]);
        t.queue_reply(&reply);
        let mut radio = Radio::new(t);
        assert!(matches!(
            radio.read_block(0, 0x80),
            Err(RadioError::IncompleteTransfer {
                offset: 0,
                expected: 0x80,
                actual: 0x40
            })
        ));
    }

    #[test]
    fn test_write_block_ack() {
        let mut t = Scripted::default();
        t.queue_reply(&[0x1E, 0x05, 0x02, 0x00, 0x00, 0x01]);
        t.queue_reply(&[0x1E, 0x05, 0x02, 0x00, 0x80, 0x01]);
        t.queue_reply(&[0x1F, 0x05, 0x02, 0x00, 0x00, 0x02]);
        t.queue_reply(&[0x1E, 0x05]);
        let mut radio = Radio::new(t);

        radio.write_block(0x0100, &[0xAA; 0x80]).unwrap();
        assert!(matches!(
            radio.write_block(0x0100, &[0xAA; 0x80]),
            Err(RadioError::Protocol { offset: 0x0100, .. })
        ));
        assert!(matches!(
            radio.write_block(0x0200, &[0xAA; 0x80]),
            Err(RadioError::Protocol { offset: 0x0200, .. })
        ));
        assert!(matches!(
            radio.write_block(0x0300, &[0xAA; 0x80]),
            Err(RadioError::Protocol { offset: 0x0300, .. })
        ));
    }

    #[test]
    fn test_write_block_rejects_bad_length() {
        let mut radio = Radio::new(Scripted::default());
        for len in [0, BLOCK_SIZE + 1] {
            assert!(matches!(
                radio.write_block(0x0100, &vec![0xAA; len]),
                Err(RadioError::Codec(uvkx_core::Error::Validation(_)))
            ));
        }
        assert!(radio.transport().written.is_empty());
    }
}
