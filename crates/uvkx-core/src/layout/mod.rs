//! EEPROM layouts
//!
//! Two firmware families store incompatible images. Everything that differs
//! between them (channel count, where the channel array starts, which address
//! ranges are written back on upload, nibble order) is data in a
//! [`MemoryMap`] selected by [`LayoutVersion`].

use core::fmt;
use core::ops::Range;
use core::str::FromStr;

use crate::error::{Error, Result};

pub mod bitfield;
pub mod channel;
pub mod settings;
pub mod tables;

pub use bitfield::{BitField, NibblePair};
pub use channel::{Channel, ChannelName, Duplex};
pub use settings::{ExpandedSettings, MinimalSettings, Settings};
pub use tables::{Bandwidth, BatteryType, Compander, Modulation, PowerLevel, RxAgc, Tone};

/// Size of the full EEPROM image
pub const IMAGE_SIZE: usize = 0x2000;
/// Transfer block size; the largest chunk the radio writes reliably
pub const BLOCK_SIZE: usize = 0x80;
/// Size of one channel record
pub const CHANNEL_SIZE: usize = 32;
/// Start of factory calibration data
pub const CALIBRATION_START: usize = 0x1E00;
/// Settings version word written by expanded firmware
pub const EXPANDED_SETTINGS_VERSION: u16 = 0x015A;

/// Firmware family image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutVersion {
    /// Flat seven-field settings, 200 channels at 0x0500
    Minimal,
    /// Packed settings with per-VFO records, 230 channels at 0x0050
    Expanded,
}

/// Address constants of one layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    /// Number of channel slots
    pub chan_max: u16,
    /// Offset of channel 1
    pub channel_base: usize,
    /// Size of the settings record at offset 0
    pub settings_size: usize,
    /// VFO settings range written on upload
    pub vfo_range: Range<usize>,
    /// User settings range written on upload
    pub user_range: Range<usize>,
    /// Channel memory range written on upload
    pub channel_range: Range<usize>,
    /// Whether nibble pairs store their first field in the low nibble
    pub nibbles_swapped: bool,
}

static MINIMAL_MAP: MemoryMap = MemoryMap {
    chan_max: 200,
    channel_base: 0x0500,
    settings_size: 8,
    vfo_range: 0x0000..0x0050,
    user_range: 0x0140..IMAGE_SIZE,
    channel_range: 0x0500..0x1E00,
    nibbles_swapped: false,
};

static EXPANDED_MAP: MemoryMap = MemoryMap {
    chan_max: 230,
    channel_base: 0x0050,
    settings_size: 80,
    vfo_range: 0x0000..0x0050,
    user_range: 0x1D10..IMAGE_SIZE,
    channel_range: 0x0050..0x1D10,
    nibbles_swapped: true,
};

/// One address range of the upload sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPhase {
    /// Progress message
    pub message: &'static str,
    /// Address range
    pub range: Range<usize>,
}

impl LayoutVersion {
    /// All supported layouts
    pub const ALL: [Self; 2] = [Self::Minimal, Self::Expanded];

    /// Address constants for this layout
    pub fn memory_map(self) -> &'static MemoryMap {
        match self {
            Self::Minimal => &MINIMAL_MAP,
            Self::Expanded => &EXPANDED_MAP,
        }
    }

    /// Highest channel number
    pub fn chan_max(self) -> u16 {
        self.memory_map().chan_max
    }

    /// Short name
    pub fn name(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Expanded => "expanded",
        }
    }

    /// Guess the layout from image contents
    ///
    /// Expanded firmware stamps its settings version at offset 0.
    pub fn detect(image: &[u8]) -> Self {
        match image {
            [lo, hi, ..] if u16::from_le_bytes([*lo, *hi]) == EXPANDED_SETTINGS_VERSION => {
                Self::Expanded
            }
            _ => Self::Minimal,
        }
    }

    /// Check a 1-based channel number
    pub fn check_channel(self, index: u16) -> Result<()> {
        let max = self.chan_max();
        if index == 0 || index > max {
            return Err(Error::InvalidLocation { index, max });
        }
        Ok(())
    }

    /// Byte range of a 1-based channel record
    pub fn channel_range(self, index: u16) -> Result<Range<usize>> {
        self.check_channel(index)?;
        let start = self.memory_map().channel_base + (index as usize - 1) * CHANNEL_SIZE;
        Ok(start..start + CHANNEL_SIZE)
    }

    /// Address ranges written by an upload, in order
    pub fn upload_phases(self) -> [UploadPhase; 3] {
        let map = self.memory_map();
        [
            UploadPhase {
                message: "Uploading VFO settings",
                range: map.vfo_range.clone(),
            },
            UploadPhase {
                message: "Uploading user settings",
                range: map.user_range.clone(),
            },
            UploadPhase {
                message: "Uploading channel memory",
                range: map.channel_range.clone(),
            },
        ]
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(Error::Validation("layout must be minimal or expanded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_arrays_fit() {
        for layout in LayoutVersion::ALL {
            let map = layout.memory_map();
            let end = map.channel_base + map.chan_max as usize * CHANNEL_SIZE;
            assert!(end <= CALIBRATION_START, "{} channels overrun", layout);
            assert_eq!(end, map.channel_range.end);
        }
    }

    #[test]
    fn test_channel_bounds() {
        let l = LayoutVersion::Minimal;
        assert_eq!(
            l.channel_range(0),
            Err(Error::InvalidLocation { index: 0, max: 200 })
        );
        assert_eq!(l.channel_range(1), Ok(0x0500..0x0520));
        assert_eq!(l.channel_range(200), Ok(0x1DE0..0x1E00));
        assert!(l.channel_range(201).is_err());

        let e = LayoutVersion::Expanded;
        assert_eq!(e.channel_range(1), Ok(0x0050..0x0070));
        assert_eq!(e.channel_range(230), Ok(0x1CF0..0x1D10));
        assert_eq!(
            e.channel_range(231),
            Err(Error::InvalidLocation { index: 231, max: 230 })
        );
    }

    #[test]
    fn test_detect() {
        assert_eq!(LayoutVersion::detect(&[0x5A, 0x01, 0x00]), LayoutVersion::Expanded);
        assert_eq!(LayoutVersion::detect(&[0x01, 0x00]), LayoutVersion::Minimal);
        assert_eq!(LayoutVersion::detect(&[]), LayoutVersion::Minimal);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Expanded".parse(), Ok(LayoutVersion::Expanded));
        assert!("v3".parse::<LayoutVersion>().is_err());
    }
}
