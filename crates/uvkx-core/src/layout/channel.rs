//! Channel record codec
//!
//! 32-byte record, shared by the channel array and the VFO sub-records of the
//! expanded settings block:
//!
//! ```text
//! 0..4    rx word: frequency bits 0..27 (10 Hz units), code type bits 27..31
//! 4       rx code index
//! 5..9    tx word (same split)
//! 9       tx code index
//! 10..20  name, NUL padded
//! 20..22  channel number (u16 LE)
//! 22      squelch / step nibbles
//! 23      modulation / bandwidth nibbles
//! 24      power:2 shift:2 tx_ste:1 rx_ste:1 compander:2
//! 25      roger:4 ptt_id:4
//! 26      rx_agc:6
//! 27..32  reserved
//! ```
//!
//! A record whose rx frequency is zero is empty.

use heapless::String;

use super::bitfield::{BitField, NibblePair};
use super::tables::{
    step_from_index, step_index, Bandwidth, Compander, Modulation, PowerLevel, RxAgc, Tone,
};
use super::{LayoutVersion, CHANNEL_SIZE};
use crate::error::{Error, Result};
use crate::image::RawImage;

/// Offset of the name field
pub const NAME_OFFSET: usize = 10;
/// Maximum name length
pub const NAME_LEN: usize = 10;

/// Channel name
pub type ChannelName = String<NAME_LEN>;

/// Field positions of a channel record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFields {
    /// RX frequency, 10 Hz units
    pub rx_freq: BitField,
    /// RX code type
    pub rx_code_type: BitField,
    /// RX code table index
    pub rx_code: BitField,
    /// TX frequency, 10 Hz units
    pub tx_freq: BitField,
    /// TX code type
    pub tx_code_type: BitField,
    /// TX code table index
    pub tx_code: BitField,
    /// Channel number
    pub number: BitField,
    /// Squelch level (first) and tuning step index (second)
    pub squelch_step: NibblePair,
    /// Modulation (first) and bandwidth (second)
    pub mode_bandwidth: NibblePair,
    /// Power level index
    pub power: BitField,
    /// Offset direction: 0 none, 1 plus, 2 minus
    pub shift: BitField,
    /// Repeater (TX) squelch tail elimination
    pub tx_ste: BitField,
    /// RX squelch tail elimination
    pub rx_ste: BitField,
    /// Compander mode
    pub compander: BitField,
    /// Roger beep mode
    pub roger: BitField,
    /// PTT-ID mode
    pub ptt_id: BitField,
    /// RX AGC index
    pub rx_agc: BitField,
}

impl ChannelFields {
    /// Field table for a given nibble order
    pub const fn new(nibbles_swapped: bool) -> Self {
        Self {
            rx_freq: BitField::new(0, 0, 27),
            rx_code_type: BitField::new(0, 27, 4),
            rx_code: BitField::byte(4),
            tx_freq: BitField::new(5, 0, 27),
            tx_code_type: BitField::new(5, 27, 4),
            tx_code: BitField::byte(9),
            number: BitField::u16le(20),
            squelch_step: NibblePair::new(22, nibbles_swapped),
            mode_bandwidth: NibblePair::new(23, nibbles_swapped),
            power: BitField::new(24, 0, 2),
            shift: BitField::new(24, 2, 2),
            tx_ste: BitField::bit(24, 4),
            rx_ste: BitField::bit(24, 5),
            compander: BitField::new(24, 6, 2),
            roger: BitField::new(25, 0, 4),
            ptt_id: BitField::new(25, 4, 4),
            rx_agc: BitField::new(26, 0, 6),
        }
    }

    /// Field table for a layout
    pub fn for_layout(layout: LayoutVersion) -> Self {
        Self::new(layout.memory_map().nibbles_swapped)
    }
}

const SHIFT_NONE: u32 = 0;
const SHIFT_PLUS: u32 = 1;
const SHIFT_MINUS: u32 = 2;

/// Transmit frequency relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Duplex {
    /// Transmit on the receive frequency
    #[default]
    Simplex,
    /// Transmit above receive by the given offset in Hz
    Plus(u64),
    /// Transmit below receive by the given offset in Hz
    Minus(u64),
    /// Transmit on an independent frequency in Hz
    Split(u64),
    /// Transmit inhibited
    Off,
}

/// A decoded, non-empty channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Receive frequency in Hz
    pub rx_freq: u64,
    /// Transmit frequency relationship
    pub duplex: Duplex,
    /// Receive squelch tone
    pub rx_tone: Tone,
    /// Transmit tone
    pub tx_tone: Tone,
    /// Name, ASCII
    pub name: ChannelName,
    /// Channel number stored in the record
    pub number: u16,
    /// Squelch level 0-15
    pub squelch: u8,
    /// Tuning step in Hz
    pub step: u32,
    /// Modulation
    pub modulation: Modulation,
    /// Receive bandwidth
    pub bandwidth: Bandwidth,
    /// Transmit power
    pub power: PowerLevel,
    /// Repeater squelch tail elimination
    pub tx_ste: bool,
    /// Squelch tail elimination
    pub rx_ste: bool,
    /// Compander
    pub compander: Compander,
    /// Roger beep mode 0-15
    pub roger: u8,
    /// PTT-ID mode 0-15
    pub ptt_id: u8,
    /// RX AGC
    pub rx_agc: RxAgc,
}

impl Channel {
    /// A simplex channel with every other field at its zero value
    pub fn new(rx_freq: u64) -> Self {
        Self {
            rx_freq,
            duplex: Duplex::Simplex,
            rx_tone: Tone::None,
            tx_tone: Tone::None,
            name: ChannelName::new(),
            number: 0,
            squelch: 0,
            step: step_from_index(0),
            modulation: Modulation::default(),
            bandwidth: Bandwidth::default(),
            power: PowerLevel::default(),
            tx_ste: false,
            rx_ste: false,
            compander: Compander::default(),
            roger: 0,
            ptt_id: 0,
            rx_agc: RxAgc::from_index(0),
        }
    }

    /// Set the name, rejecting non-ASCII or names longer than ten characters
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if !name.is_ascii() {
            return Err(Error::Validation("channel name must be ASCII"));
        }
        let mut s = ChannelName::new();
        s.push_str(name)
            .map_err(|_| Error::Validation("channel name longer than 10 characters"))?;
        self.name = s;
        Ok(())
    }

    /// Effective transmit frequency in Hz, `None` when transmit is off
    pub fn tx_freq(&self) -> Option<u64> {
        match self.duplex {
            Duplex::Simplex => Some(self.rx_freq),
            Duplex::Plus(off) => Some(self.rx_freq.saturating_add(off)),
            Duplex::Minus(off) => Some(self.rx_freq.saturating_sub(off)),
            Duplex::Split(tx) => Some(tx),
            Duplex::Off => None,
        }
    }
}

/// Raw frequency (10 Hz units) to Hz
pub fn decode_freq(raw: u32) -> u64 {
    raw as u64 * 10
}

/// Hz to raw frequency, rounded to the nearest 10 Hz and saturated
pub fn encode_freq(hz: u64) -> u32 {
    (hz.saturating_add(5) / 10).min(u32::MAX as u64) as u32
}

fn decode_duplex(rx_hz: u64, tx_hz: u64, shift: u32) -> Duplex {
    if tx_hz == 0 {
        return Duplex::Off;
    }
    // A shift that disagrees with the stored frequencies reads as split, so
    // every decoded offset encodes back to the same tx frequency.
    match shift {
        SHIFT_PLUS if tx_hz >= rx_hz => Duplex::Plus(tx_hz - rx_hz),
        SHIFT_MINUS if tx_hz <= rx_hz => Duplex::Minus(rx_hz - tx_hz),
        _ if tx_hz != rx_hz => Duplex::Split(tx_hz),
        _ => Duplex::Simplex,
    }
}

/// Raw (tx frequency, shift) for a duplex setting; `None` keeps the stored shift
fn encode_duplex(rx_hz: u64, duplex: Duplex) -> Result<(u32, Option<u32>)> {
    match duplex {
        Duplex::Simplex => Ok((encode_freq(rx_hz), Some(SHIFT_NONE))),
        Duplex::Plus(off) => Ok((encode_freq(rx_hz.saturating_add(off)), Some(SHIFT_PLUS))),
        Duplex::Minus(off) => {
            if off >= rx_hz {
                return Err(Error::Validation("minus offset exceeds receive frequency"));
            }
            Ok((encode_freq(rx_hz - off), Some(SHIFT_MINUS)))
        }
        Duplex::Split(tx) => {
            if encode_freq(tx) == 0 {
                return Err(Error::Validation("split transmit frequency is zero"));
            }
            Ok((encode_freq(tx), Some(SHIFT_NONE)))
        }
        Duplex::Off => Ok((0, None)),
    }
}

fn decode_name(raw: &[u8]) -> ChannelName {
    let mut name = ChannelName::new();
    for &b in raw.iter().take_while(|&&b| b != 0x00 && b != 0xFF) {
        let c = if (0x20..=0x7E).contains(&b) { b as char } else { ' ' };
        let _ = name.push(c);
    }
    name
}

/// Decode a channel record; `None` when empty
pub fn decode_record(record: &[u8], fields: &ChannelFields) -> Option<Channel> {
    let rx_raw = fields.rx_freq.get(record);
    if rx_raw == 0 {
        return None;
    }
    let rx_freq = decode_freq(rx_raw);
    let tx_freq = decode_freq(fields.tx_freq.get(record));

    Some(Channel {
        rx_freq,
        duplex: decode_duplex(rx_freq, tx_freq, fields.shift.get(record)),
        rx_tone: Tone::decode(
            fields.rx_code_type.get(record) as u8,
            fields.rx_code.get(record) as u8,
        ),
        tx_tone: Tone::decode(
            fields.tx_code_type.get(record) as u8,
            fields.tx_code.get(record) as u8,
        ),
        name: decode_name(&record[NAME_OFFSET..NAME_OFFSET + NAME_LEN]),
        number: fields.number.get(record) as u16,
        squelch: fields.squelch_step.first().get(record) as u8,
        step: step_from_index(fields.squelch_step.second().get(record) as u8),
        modulation: Modulation::from_index(fields.mode_bandwidth.first().get(record) as u8),
        bandwidth: Bandwidth::from_index(fields.mode_bandwidth.second().get(record) as u8),
        power: PowerLevel::from_index(fields.power.get(record) as u8),
        tx_ste: fields.tx_ste.get_bool(record),
        rx_ste: fields.rx_ste.get_bool(record),
        compander: Compander::from_index(fields.compander.get(record) as u8),
        roger: fields.roger.get(record) as u8,
        ptt_id: fields.ptt_id.get(record) as u8,
        rx_agc: RxAgc::from_index(fields.rx_agc.get(record) as u8),
    })
}

/// Encode a channel into a record
///
/// Reserved bits are preserved. Nothing is written if any field is invalid.
pub fn encode_record(record: &mut [u8], channel: &Channel, fields: &ChannelFields) -> Result<()> {
    let rx_raw = encode_freq(channel.rx_freq);
    if rx_raw == 0 {
        return Err(Error::Validation("channel has no receive frequency"));
    }
    if !channel.name.is_ascii() {
        return Err(Error::Validation("channel name must be ASCII"));
    }
    let (tx_raw, shift) = encode_duplex(channel.rx_freq, channel.duplex)?;
    let (rx_type, rx_code) = channel.rx_tone.encode()?;
    let (tx_type, tx_code) = channel.tx_tone.encode()?;
    let agc = channel.rx_agc.index()?;

    let mut rec = [0u8; CHANNEL_SIZE];
    rec.copy_from_slice(&record[..CHANNEL_SIZE]);

    fields.rx_freq.set(&mut rec, rx_raw);
    fields.rx_code_type.set(&mut rec, rx_type as u32);
    fields.rx_code.set(&mut rec, rx_code as u32);
    fields.tx_freq.set(&mut rec, tx_raw);
    fields.tx_code_type.set(&mut rec, tx_type as u32);
    fields.tx_code.set(&mut rec, tx_code as u32);

    let name = &mut rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN];
    name.fill(0);
    name[..channel.name.len()].copy_from_slice(channel.name.as_bytes());

    fields.number.set(&mut rec, channel.number as u32);
    fields.squelch_step.first().set(&mut rec, channel.squelch as u32);
    fields
        .squelch_step
        .second()
        .set(&mut rec, step_index(channel.step) as u32);
    fields
        .mode_bandwidth
        .first()
        .set(&mut rec, channel.modulation.index() as u32);
    fields
        .mode_bandwidth
        .second()
        .set(&mut rec, channel.bandwidth.index() as u32);
    fields.power.set(&mut rec, channel.power.index() as u32);
    if let Some(shift) = shift {
        fields.shift.set(&mut rec, shift);
    }
    fields.tx_ste.set_bool(&mut rec, channel.tx_ste);
    fields.rx_ste.set_bool(&mut rec, channel.rx_ste);
    fields.compander.set(&mut rec, channel.compander.index() as u32);
    fields.roger.set(&mut rec, channel.roger as u32);
    fields.ptt_id.set(&mut rec, channel.ptt_id as u32);
    fields.rx_agc.set(&mut rec, agc as u32);

    record[..CHANNEL_SIZE].copy_from_slice(&rec);
    Ok(())
}

/// Reset a record to the empty state
pub fn clear_record(record: &mut [u8]) {
    record[..CHANNEL_SIZE].fill(0);
}

/// Decode channel `index` (1-based); `None` when the slot is empty
pub fn decode_channel(
    image: &RawImage,
    index: u16,
    layout: LayoutVersion,
) -> Result<Option<Channel>> {
    let range = layout.channel_range(index)?;
    let fields = ChannelFields::for_layout(layout);
    Ok(decode_record(&image.as_bytes()[range], &fields))
}

/// Store channel `index` (1-based); `None` clears the slot
pub fn encode_channel(
    image: &mut RawImage,
    index: u16,
    channel: Option<&Channel>,
    layout: LayoutVersion,
) -> Result<()> {
    let range = layout.channel_range(index)?;
    let record = &mut image.as_bytes_mut()[range];
    match channel {
        Some(ch) => encode_record(record, ch, &ChannelFields::for_layout(layout)),
        None => {
            clear_record(record);
            Ok(())
        }
    }
}

/// Clear channel `index` (1-based)
pub fn clear_channel(image: &mut RawImage, index: u16, layout: LayoutVersion) -> Result<()> {
    encode_channel(image, index, None, layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(index: u16) -> [u8; CHANNEL_SIZE] {
        let mut rec = [0u8; CHANNEL_SIZE];
        let fields = ChannelFields::new(true);
        let rx = 14_500_000 + index as u32 * 1_250;
        fields.rx_freq.set(&mut rec, rx);
        fields.rx_code_type.set(&mut rec, 1);
        fields.rx_code.set(&mut rec, (index % 50) as u32);
        fields.tx_freq.set(&mut rec, rx + 60_000);
        fields.tx_code_type.set(&mut rec, 2 + (index % 2) as u32);
        fields.tx_code.set(&mut rec, (index % 104) as u32);
        rec[NAME_OFFSET..NAME_OFFSET + 4].copy_from_slice(b"RPT1");
        fields.number.set(&mut rec, index as u32);
        rec[22] = 0x63;
        rec[23] = 0x51;
        fields.power.set(&mut rec, 2);
        fields.shift.set(&mut rec, SHIFT_PLUS);
        fields.rx_ste.set_bool(&mut rec, true);
        fields.compander.set(&mut rec, 3);
        rec[25] = 0x21;
        fields.rx_agc.set(&mut rec, 18);
        rec[27..].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x55]);
        rec
    }

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(decode_freq(14_550_000), 145_500_000);
        assert_eq!(encode_freq(145_500_000), 14_550_000);
        assert_eq!(encode_freq(145_500_004), 14_550_000);
        assert_eq!(encode_freq(145_500_005), 14_550_001);
        assert_eq!(encode_freq(u64::MAX), u32::MAX);
        for hz in [10u64, 446_006_250, 1_300_000_000] {
            assert_eq!(decode_freq(encode_freq(hz)), hz);
        }
    }

    #[test]
    fn test_decode_expanded_record() {
        let rec = sample_record(12);
        let ch = decode_record(&rec, &ChannelFields::new(true)).unwrap();

        assert_eq!(ch.rx_freq, 145_150_000);
        assert_eq!(ch.duplex, Duplex::Plus(600_000));
        assert_eq!(ch.rx_tone, Tone::Ctcss(1000));
        assert_eq!(ch.tx_tone, Tone::Dtcs(71));
        assert_eq!(ch.name.as_str(), "RPT1");
        assert_eq!(ch.number, 12);
        // Expanded: first-declared field in the low nibble
        assert_eq!(ch.squelch, 3);
        assert_eq!(ch.step, 12_500);
        assert_eq!(ch.modulation, Modulation::Am);
        assert_eq!(ch.bandwidth, Bandwidth::W12k);
        assert_eq!(ch.power, PowerLevel::High);
        assert!(!ch.tx_ste);
        assert!(ch.rx_ste);
        assert_eq!(ch.compander, Compander::RxTx);
        assert_eq!(ch.roger, 1);
        assert_eq!(ch.ptt_id, 2);
        assert_eq!(ch.rx_agc, RxAgc::Auto);
    }

    #[test]
    fn test_minimal_nibble_order() {
        let rec = sample_record(1);
        let ch = decode_record(&rec, &ChannelFields::new(false)).unwrap();
        assert_eq!(ch.squelch, 6);
        assert_eq!(ch.step, 5_000);
        assert_eq!(ch.modulation, Modulation::Raw);
        assert_eq!(ch.bandwidth, Bandwidth::W23k);
    }

    #[test]
    fn test_record_round_trip_preserves_bytes() {
        for swapped in [true, false] {
            let fields = ChannelFields::new(swapped);
            for index in [1u16, 7, 49, 103, 200] {
                let original = sample_record(index);
                let ch = decode_record(&original, &fields).unwrap();
                let mut rewritten = original;
                encode_record(&mut rewritten, &ch, &fields).unwrap();
                assert_eq!(rewritten, original, "index {} swapped {}", index, swapped);
            }
        }
    }

    #[test]
    fn test_empty_record_ignores_other_fields() {
        let mut rec = sample_record(3);
        ChannelFields::new(true).rx_freq.set(&mut rec, 0);
        assert!(decode_record(&rec, &ChannelFields::new(true)).is_none());
    }

    #[test]
    fn test_duplex_round_trip() {
        let fields = ChannelFields::new(true);
        let rx = 438_500_000;
        let cases = [
            Duplex::Simplex,
            Duplex::Plus(5_000_000),
            Duplex::Minus(7_600_000),
            Duplex::Split(145_000_000),
            Duplex::Off,
        ];
        for duplex in cases {
            let mut ch = Channel::new(rx);
            ch.duplex = duplex;
            let mut rec = [0u8; CHANNEL_SIZE];
            encode_record(&mut rec, &ch, &fields).unwrap();
            let back = decode_record(&rec, &fields).unwrap();
            assert_eq!(back.duplex, duplex);
            assert_eq!(back.tx_freq(), ch.tx_freq());
        }
    }

    #[test]
    fn test_duplex_decode_rules() {
        assert_eq!(decode_duplex(100, 0, SHIFT_PLUS), Duplex::Off);
        assert_eq!(decode_duplex(100, 150, SHIFT_PLUS), Duplex::Plus(50));
        assert_eq!(decode_duplex(100, 40, SHIFT_MINUS), Duplex::Minus(60));
        assert_eq!(decode_duplex(100, 300, SHIFT_NONE), Duplex::Split(300));
        assert_eq!(decode_duplex(100, 100, SHIFT_NONE), Duplex::Simplex);
        assert_eq!(decode_duplex(100, 100, 3), Duplex::Simplex);
        assert_eq!(decode_duplex(100, 300, SHIFT_MINUS), Duplex::Split(300));
        assert_eq!(decode_duplex(100, 40, SHIFT_PLUS), Duplex::Split(40));
    }

    #[test]
    fn test_mismatched_shift_keeps_tx_frequency() {
        let fields = ChannelFields::new(true);
        let mut rec = [0u8; CHANNEL_SIZE];
        fields.rx_freq.set(&mut rec, 14_500_000);
        fields.tx_freq.set(&mut rec, 43_500_000);
        fields.shift.set(&mut rec, SHIFT_MINUS);

        let ch = decode_record(&rec, &fields).unwrap();
        assert_eq!(ch.duplex, Duplex::Split(435_000_000));
        let mut out = rec;
        encode_record(&mut out, &ch, &fields).unwrap();
        assert_eq!(fields.tx_freq.get(&out), 43_500_000);
        assert_eq!(decode_record(&out, &fields), Some(ch));
    }

    #[test]
    fn test_tx_off_keeps_shift_bits() {
        let fields = ChannelFields::new(true);
        let mut rec = [0u8; CHANNEL_SIZE];
        fields.rx_freq.set(&mut rec, 14_500_000);
        fields.shift.set(&mut rec, SHIFT_MINUS);

        let ch = decode_record(&rec, &fields).unwrap();
        assert_eq!(ch.duplex, Duplex::Off);
        let mut out = rec;
        encode_record(&mut out, &ch, &fields).unwrap();
        assert_eq!(out, rec);
    }

    #[test]
    fn test_encode_rejects_invalid_without_writing() {
        let fields = ChannelFields::new(true);
        let original = sample_record(5);

        let mut ch = decode_record(&original, &fields).unwrap();
        ch.tx_tone = Tone::Ctcss(9999);
        let mut rec = original;
        assert_eq!(
            encode_record(&mut rec, &ch, &fields),
            Err(Error::UnsupportedTone { tenths: 9999 })
        );
        assert_eq!(rec, original);

        let mut ch = Channel::new(0);
        ch.squelch = 3;
        assert!(matches!(
            encode_record(&mut rec, &ch, &fields),
            Err(Error::Validation(_))
        ));

        let mut ch = Channel::new(100_000);
        ch.duplex = Duplex::Minus(200_000);
        assert!(matches!(
            encode_record(&mut rec, &ch, &fields),
            Err(Error::Validation(_))
        ));
        assert_eq!(rec, original);
    }

    #[test]
    fn test_frequency_saturates_to_field() {
        let fields = ChannelFields::new(true);
        let mut ch = Channel::new(5_000_000_000);
        ch.duplex = Duplex::Off;
        let mut rec = [0u8; CHANNEL_SIZE];
        encode_record(&mut rec, &ch, &fields).unwrap();
        assert_eq!(fields.rx_freq.get(&rec), 0x07FF_FFFF);
        assert_eq!(fields.rx_code_type.get(&rec), 0);
    }

    #[test]
    fn test_name_handling() {
        let mut ch = Channel::new(145_000_000);
        assert!(ch.set_name("ABCDEFGHIJK").is_err());
        assert!(ch.set_name("CAFÉ").is_err());
        ch.set_name("CALL").unwrap();

        let fields = ChannelFields::new(false);
        let mut rec = [0xFFu8; CHANNEL_SIZE];
        encode_record(&mut rec, &ch, &fields).unwrap();
        assert_eq!(&rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN], b"CALL\0\0\0\0\0\0");

        rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN].copy_from_slice(b"AB\x01C\xFFxxxxx");
        assert_eq!(decode_name(&rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN]).as_str(), "AB C");
    }

    #[test]
    fn test_channel_index_validation() {
        let mut image = RawImage::new();
        for layout in LayoutVersion::ALL {
            let max = layout.chan_max();
            assert_eq!(
                decode_channel(&image, 0, layout),
                Err(Error::InvalidLocation { index: 0, max })
            );
            assert_eq!(
                decode_channel(&image, max + 1, layout),
                Err(Error::InvalidLocation {
                    index: max + 1,
                    max
                })
            );
            assert_eq!(decode_channel(&image, 1, layout), Ok(None));
            assert_eq!(decode_channel(&image, max, layout), Ok(None));

            let ch = Channel::new(446_006_250);
            assert!(encode_channel(&mut image, 0, Some(&ch), layout).is_err());
            assert!(encode_channel(&mut image, max + 1, Some(&ch), layout).is_err());
            encode_channel(&mut image, 1, Some(&ch), layout).unwrap();
            encode_channel(&mut image, max, Some(&ch), layout).unwrap();
            assert_eq!(decode_channel(&image, max, layout), Ok(Some(ch)));
        }
    }

    #[test]
    fn test_clear_channel_zeroes_slot() {
        let mut image = RawImage::new();
        let layout = LayoutVersion::Expanded;
        let range = layout.channel_range(4).unwrap();
        image.as_bytes_mut()[range.clone()].copy_from_slice(&sample_record(4));

        clear_channel(&mut image, 4, layout).unwrap();
        assert!(image.as_bytes()[range].iter().all(|&b| b == 0));
        assert_eq!(decode_channel(&image, 4, layout), Ok(None));
    }
}
