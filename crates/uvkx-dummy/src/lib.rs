//! uvkx-dummy - In-memory UV-Kx radio emulator
//!
//! [`DummyRadio`] implements [`Transport`] by decoding the command frames
//! written to it and queueing the replies a real radio would send. It keeps
//! an 8 KiB EEPROM, so downloads and uploads can be exercised end to end
//! without hardware. Faults can be injected to test error paths.

use std::collections::VecDeque;
use std::time::Duration;

use bitflags::bitflags;
use uvkx_core::layout::IMAGE_SIZE;
use uvkx_core::protocol::frame::{
    decode_frame, encode_frame, parse_header, CMD_HELLO, CMD_READ_MEM, CMD_RESET, CMD_WRITE_MEM,
    FOOTER_LEN, HEADER_LEN, OPCODE_HIGH, READ_REPLY_HEADER_LEN, REPLY_HELLO, REPLY_READ_MEM,
    REPLY_WRITE_MEM,
};
use uvkx_core::RawImage;
use uvkx_serial::{Result, Transport};

bitflags! {
    /// Misbehaviours the emulator can be told to show
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Faults: u32 {
        /// Answer hello with a reply that has no printable firmware string
        const NO_FIRMWARE = 1 << 0;
        /// Acknowledge writes with the wrong opcode
        const BAD_ACK_OPCODE = 1 << 1;
        /// Acknowledge writes echoing the wrong offset
        const BAD_ACK_OFFSET = 1 << 2;
        /// Return half the requested bytes on reads
        const SHORT_READ = 1 << 3;
        /// Never reply
        const SILENT = 1 << 4;
    }
}

/// Emulator configuration
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Firmware string reported in hello replies
    pub firmware: String,
    /// Number of hellos answered with an empty body before a real reply
    pub empty_hellos: u32,
    /// Injected faults
    pub faults: Faults,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            firmware: "k5dummy 1.0".into(),
            empty_hellos: 0,
            faults: Faults::empty(),
        }
    }
}

/// Emulated radio
pub struct DummyRadio {
    config: DummyConfig,
    eeprom: RawImage,
    inbound: Vec<u8>,
    outbound: VecDeque<u8>,
    writes: Vec<(u16, usize)>,
    hellos: u32,
    resets: u32,
    crc_errors: u32,
}

impl DummyRadio {
    /// Create an emulator with a zeroed EEPROM
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            eeprom: RawImage::new(),
            inbound: Vec::new(),
            outbound: VecDeque::new(),
            writes: Vec::new(),
            hellos: 0,
            resets: 0,
            crc_errors: 0,
        }
    }

    /// Create an emulator with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create an emulator holding a given EEPROM image
    pub fn with_image(config: DummyConfig, image: RawImage) -> Self {
        let mut radio = Self::new(config);
        radio.eeprom = image;
        radio
    }

    /// EEPROM contents
    pub fn eeprom(&self) -> &RawImage {
        &self.eeprom
    }

    /// Change the injected faults
    pub fn set_faults(&mut self, faults: Faults) {
        self.config.faults = faults;
    }

    /// Offset and length of every write command received, in order
    pub fn writes(&self) -> &[(u16, usize)] {
        &self.writes
    }

    /// Number of hello commands received
    pub fn hellos(&self) -> u32 {
        self.hellos
    }

    /// Number of reset commands received
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Number of commands whose CRC did not match their body
    pub fn crc_errors(&self) -> u32 {
        self.crc_errors
    }

    /// Decode and handle every complete frame in the inbound buffer
    fn process_inbound(&mut self) {
        while self.inbound.len() >= HEADER_LEN {
            let len = match parse_header(&self.inbound[..HEADER_LEN]) {
                Ok(len) => len,
                Err(e) => {
                    log::warn!("dummy: dropping byte, {}", e);
                    self.inbound.remove(0);
                    continue;
                }
            };
            let total = HEADER_LEN + len + FOOTER_LEN;
            if self.inbound.len() < total {
                return;
            }

            let frame: Vec<u8> = self.inbound.drain(..total).collect();
            match decode_frame(&frame) {
                Ok(decoded) => {
                    if !decoded.crc_valid() {
                        log::warn!("dummy: CRC mismatch on command");
                        self.crc_errors += 1;
                    }
                    self.handle_command(&decoded.body);
                }
                Err(e) => log::warn!("dummy: bad frame, {}", e),
            }
        }
    }

    fn handle_command(&mut self, body: &[u8]) {
        match body {
            [CMD_HELLO, OPCODE_HIGH, ..] => self.handle_hello(),
            [CMD_READ_MEM, OPCODE_HIGH, _, _, lo, hi, len, ..] => {
                self.handle_read(u16::from_le_bytes([*lo, *hi]), *len as usize)
            }
            [CMD_WRITE_MEM, OPCODE_HIGH, _, _, lo, hi, len, _, _, _, _, _, data @ ..] => {
                self.handle_write(u16::from_le_bytes([*lo, *hi]), *len as usize, data)
            }
            [CMD_RESET, OPCODE_HIGH, ..] => {
                log::debug!("dummy: reset");
                self.resets += 1;
            }
            _ => log::warn!("dummy: unknown command {:02X?}", body.get(..2)),
        }
    }

    fn handle_hello(&mut self) {
        self.hellos += 1;
        if self.hellos <= self.config.empty_hellos {
            self.reply(&[]);
            return;
        }

        let mut body = vec![REPLY_HELLO, OPCODE_HIGH, 0, 0];
        if self.config.faults.contains(Faults::NO_FIRMWARE) {
            body.push(0x01);
        } else {
            body.extend_from_slice(self.config.firmware.as_bytes());
            body.push(0);
        }
        body[2] = (body.len() - 4) as u8;
        self.reply(&body);
    }

    fn handle_read(&mut self, offset: u16, len: usize) {
        let start = (offset as usize).min(IMAGE_SIZE);
        let mut end = (start + len).min(IMAGE_SIZE);
        if self.config.faults.contains(Faults::SHORT_READ) {
            end = start + (end - start) / 2;
        }
        let data = &self.eeprom.as_bytes()[start..end];

        let off = offset.to_le_bytes();
        let mut body = vec![
            REPLY_READ_MEM,
            OPCODE_HIGH,
            (data.len() + 4) as u8,
            0,
            off[0],
            off[1],
            data.len() as u8,
            0,
        ];
        debug_assert_eq!(body.len(), READ_REPLY_HEADER_LEN);
        body.extend_from_slice(data);
        self.reply(&body);
    }

    fn handle_write(&mut self, offset: u16, len: usize, data: &[u8]) {
        let faults = self.config.faults;
        self.writes.push((offset, len));

        let start = (offset as usize).min(IMAGE_SIZE);
        let n = len.min(data.len()).min(IMAGE_SIZE - start);
        let bad_ack = faults.intersects(Faults::BAD_ACK_OPCODE | Faults::BAD_ACK_OFFSET);
        if !bad_ack {
            self.eeprom.as_bytes_mut()[start..start + n].copy_from_slice(&data[..n]);
        }

        let opcode = if faults.contains(Faults::BAD_ACK_OPCODE) {
            REPLY_WRITE_MEM + 1
        } else {
            REPLY_WRITE_MEM
        };
        let echo = if faults.contains(Faults::BAD_ACK_OFFSET) {
            offset.wrapping_add(1)
        } else {
            offset
        };
        let e = echo.to_le_bytes();
        self.reply(&[opcode, OPCODE_HIGH, 0x02, 0x00, e[0], e[1]]);
    }

    fn reply(&mut self, body: &[u8]) {
        if self.config.faults.contains(Faults::SILENT) {
            return;
        }
        match encode_frame(body) {
            Ok(frame) => self.outbound.extend(frame.iter().copied()),
            Err(e) => log::warn!("dummy: cannot frame reply, {}", e),
        }
    }
}

impl Transport for DummyRadio {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inbound.extend_from_slice(data);
        self.process_inbound();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.outbound.len());
        for (dst, src) in buf.iter_mut().zip(self.outbound.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }

    fn set_timeout(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
