//! Settings record codec
//!
//! The settings record lives at offset 0 and its shape depends on the
//! firmware family. Both encoders read-modify-write, so bytes the codec
//! does not model are left untouched. A VFO record is only re-encoded when
//! its decoded value differs from what the image already holds.

use super::bitfield::BitField;
use super::channel::{self, Channel, ChannelFields};
use super::tables::BatteryType;
use super::{LayoutVersion, CHANNEL_SIZE, EXPANDED_SETTINGS_VERSION};
use crate::error::{Error, Result};
use crate::image::RawImage;

/// Flat settings of the minimal firmware
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimalSettings {
    /// Call channel, 1-based
    pub call_channel: u16,
    /// Maximum talk time
    pub max_talk_time: u8,
    /// TX deviation
    pub tx_deviation: u8,
    /// Keypad lock
    pub key_lock: bool,
    /// VOX enabled
    pub vox: bool,
    /// VOX sensitivity
    pub vox_level: u8,
    /// Microphone gain, stored as is
    pub mic_gain: u8,
}

mod minimal {
    use super::BitField;

    pub const CALL_CHANNEL: BitField = BitField::u16le(0);
    pub const MAX_TALK_TIME: BitField = BitField::byte(2);
    pub const TX_DEVIATION: BitField = BitField::byte(3);
    pub const KEY_LOCK: BitField = BitField::byte(4);
    pub const VOX: BitField = BitField::byte(5);
    pub const VOX_LEVEL: BitField = BitField::byte(6);
    pub const MIC_GAIN: BitField = BitField::byte(7);
}

/// Packed settings of the expanded firmware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSettings {
    /// Settings version word
    pub version: u16,
    /// Battery pack
    pub battery_type: BatteryType,
    /// Busy channel lockout
    pub busy_lockout: bool,
    /// Key beep
    pub beep: bool,
    /// Backlight brightness 0-15
    pub backlight_level: u8,
    /// Backlight timeout index 0-15
    pub backlight_time: u8,
    /// Microphone gain index
    pub mic_gain: u8,
    /// LCD contrast 0-15
    pub lcd_contrast: u8,
    /// TX timeout index 0-15
    pub tx_timeout: u8,
    /// Battery save ratio index 0-15
    pub battery_save: u8,
    /// Backlight mode 0-3
    pub backlight_mode: u8,
    /// Per-VFO "channel mode" selection
    pub vfo_select: [bool; 2],
    /// Selected channel of each VFO
    pub channel: [u16; 2],
    /// VFO working records
    pub vfo: [Option<Channel>; 2],
}

impl Default for ExpandedSettings {
    fn default() -> Self {
        Self {
            version: EXPANDED_SETTINGS_VERSION,
            battery_type: BatteryType::default(),
            busy_lockout: false,
            beep: false,
            backlight_level: 0,
            backlight_time: 0,
            mic_gain: 0,
            lcd_contrast: 0,
            tx_timeout: 0,
            battery_save: 0,
            backlight_mode: 0,
            vfo_select: [false; 2],
            channel: [1; 2],
            vfo: [None, None],
        }
    }
}

mod expanded {
    use super::BitField;

    pub const VERSION: BitField = BitField::u16le(0);
    pub const BATTERY_TYPE: BitField = BitField::new(2, 0, 2);
    pub const BUSY_LOCKOUT: BitField = BitField::bit(2, 2);
    pub const BEEP: BitField = BitField::bit(2, 3);
    pub const BACKLIGHT_LEVEL: BitField = BitField::new(2, 4, 4);
    pub const BACKLIGHT_TIME: BitField = BitField::new(3, 0, 4);
    pub const MIC_GAIN: BitField = BitField::new(3, 4, 4);
    pub const LCD_CONTRAST: BitField = BitField::new(4, 0, 4);
    pub const TX_TIMEOUT: BitField = BitField::new(4, 4, 4);
    pub const BATTERY_SAVE: BitField = BitField::new(5, 0, 4);
    pub const BACKLIGHT_MODE: BitField = BitField::new(5, 4, 2);
    pub const VFO_SELECT: [BitField; 2] = [BitField::bit(5, 6), BitField::bit(5, 7)];
    pub const CHANNEL: [BitField; 2] = [BitField::u16le(6), BitField::u16le(8)];
    pub const VFO_RECORDS: [usize; 2] = [0x0A, 0x2A];
}

/// Settings record of either layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settings {
    /// Minimal firmware settings
    Minimal(MinimalSettings),
    /// Expanded firmware settings
    Expanded(ExpandedSettings),
}

impl Settings {
    /// Layout this record belongs to
    pub fn layout(&self) -> LayoutVersion {
        match self {
            Self::Minimal(_) => LayoutVersion::Minimal,
            Self::Expanded(_) => LayoutVersion::Expanded,
        }
    }
}

// Expanded firmware stores mic gain one above the menu index. The minimal
// firmware stores the byte as is.
fn decode_mic_gain(raw: u32) -> u8 {
    raw.saturating_sub(1) as u8
}

fn encode_mic_gain(field: BitField, gain: u8) -> Result<u32> {
    let raw = gain as u32 + 1;
    if raw > field.max() {
        return Err(Error::Validation("mic gain out of range"));
    }
    Ok(raw)
}

fn decode_minimal(raw: &[u8]) -> MinimalSettings {
    MinimalSettings {
        call_channel: minimal::CALL_CHANNEL.get(raw) as u16,
        max_talk_time: minimal::MAX_TALK_TIME.get(raw) as u8,
        tx_deviation: minimal::TX_DEVIATION.get(raw) as u8,
        key_lock: minimal::KEY_LOCK.get_bool(raw),
        vox: minimal::VOX.get_bool(raw),
        vox_level: minimal::VOX_LEVEL.get(raw) as u8,
        mic_gain: minimal::MIC_GAIN.get(raw) as u8,
    }
}

fn encode_minimal(raw: &mut [u8], s: &MinimalSettings) -> Result<()> {
    LayoutVersion::Minimal.check_channel(s.call_channel)?;

    minimal::CALL_CHANNEL.set(raw, s.call_channel as u32);
    minimal::MAX_TALK_TIME.set(raw, s.max_talk_time as u32);
    minimal::TX_DEVIATION.set(raw, s.tx_deviation as u32);
    minimal::KEY_LOCK.set_bool(raw, s.key_lock);
    minimal::VOX.set_bool(raw, s.vox);
    minimal::VOX_LEVEL.set(raw, s.vox_level as u32);
    minimal::MIC_GAIN.set(raw, s.mic_gain as u32);
    Ok(())
}

fn decode_expanded(raw: &[u8]) -> ExpandedSettings {
    let fields = ChannelFields::for_layout(LayoutVersion::Expanded);
    let vfo = expanded::VFO_RECORDS
        .map(|off| channel::decode_record(&raw[off..off + CHANNEL_SIZE], &fields));

    ExpandedSettings {
        version: expanded::VERSION.get(raw) as u16,
        battery_type: BatteryType::from_index(expanded::BATTERY_TYPE.get(raw) as u8),
        busy_lockout: expanded::BUSY_LOCKOUT.get_bool(raw),
        beep: expanded::BEEP.get_bool(raw),
        backlight_level: expanded::BACKLIGHT_LEVEL.get(raw) as u8,
        backlight_time: expanded::BACKLIGHT_TIME.get(raw) as u8,
        mic_gain: decode_mic_gain(expanded::MIC_GAIN.get(raw)),
        lcd_contrast: expanded::LCD_CONTRAST.get(raw) as u8,
        tx_timeout: expanded::TX_TIMEOUT.get(raw) as u8,
        battery_save: expanded::BATTERY_SAVE.get(raw) as u8,
        backlight_mode: expanded::BACKLIGHT_MODE.get(raw) as u8,
        vfo_select: expanded::VFO_SELECT.map(|f| f.get_bool(raw)),
        channel: expanded::CHANNEL.map(|f| f.get(raw) as u16),
        vfo,
    }
}

fn encode_expanded(raw: &mut [u8], s: &ExpandedSettings) -> Result<()> {
    let mic = encode_mic_gain(expanded::MIC_GAIN, s.mic_gain)?;
    let fields = ChannelFields::for_layout(LayoutVersion::Expanded);

    // VFO records first; they are the only part that can fail mid-way.
    let mut vfo_raw = [[0u8; CHANNEL_SIZE]; 2];
    for ((buf, &off), vfo) in vfo_raw
        .iter_mut()
        .zip(expanded::VFO_RECORDS.iter())
        .zip(s.vfo.iter())
    {
        buf.copy_from_slice(&raw[off..off + CHANNEL_SIZE]);
        if channel::decode_record(buf, &fields).as_ref() == vfo.as_ref() {
            continue;
        }
        match vfo {
            Some(ch) => channel::encode_record(buf, ch, &fields)?,
            None => channel::clear_record(buf),
        }
    }

    expanded::VERSION.set(raw, s.version as u32);
    expanded::BATTERY_TYPE.set(raw, s.battery_type.index() as u32);
    expanded::BUSY_LOCKOUT.set_bool(raw, s.busy_lockout);
    expanded::BEEP.set_bool(raw, s.beep);
    expanded::BACKLIGHT_LEVEL.set(raw, s.backlight_level as u32);
    expanded::BACKLIGHT_TIME.set(raw, s.backlight_time as u32);
    expanded::MIC_GAIN.set(raw, mic);
    expanded::LCD_CONTRAST.set(raw, s.lcd_contrast as u32);
    expanded::TX_TIMEOUT.set(raw, s.tx_timeout as u32);
    expanded::BATTERY_SAVE.set(raw, s.battery_save as u32);
    expanded::BACKLIGHT_MODE.set(raw, s.backlight_mode as u32);
    for (field, &sel) in expanded::VFO_SELECT.iter().zip(s.vfo_select.iter()) {
        field.set_bool(raw, sel);
    }
    for (field, &ch) in expanded::CHANNEL.iter().zip(s.channel.iter()) {
        field.set(raw, ch as u32);
    }
    for (buf, &off) in vfo_raw.iter().zip(expanded::VFO_RECORDS.iter()) {
        raw[off..off + CHANNEL_SIZE].copy_from_slice(buf);
    }
    Ok(())
}

/// Decode the settings record at offset 0
pub fn decode_settings(image: &RawImage, layout: LayoutVersion) -> Settings {
    let raw = &image.as_bytes()[..layout.memory_map().settings_size];
    match layout {
        LayoutVersion::Minimal => Settings::Minimal(decode_minimal(raw)),
        LayoutVersion::Expanded => Settings::Expanded(decode_expanded(raw)),
    }
}

/// Encode the settings record at offset 0
///
/// Nothing is written if any field is invalid or the variant does not
/// match `layout`.
pub fn encode_settings(
    image: &mut RawImage,
    settings: &Settings,
    layout: LayoutVersion,
) -> Result<()> {
    if settings.layout() != layout {
        return Err(Error::Validation("settings do not match layout"));
    }
    let size = layout.memory_map().settings_size;
    let mut buf = [0u8; 80];
    let raw = &mut buf[..size];
    raw.copy_from_slice(&image.as_bytes()[..size]);

    match settings {
        Settings::Minimal(s) => encode_minimal(raw, s)?,
        Settings::Expanded(s) => encode_expanded(raw, s)?,
    }

    image.as_bytes_mut()[..size].copy_from_slice(raw);
    Ok(())
}
