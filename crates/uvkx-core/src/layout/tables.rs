//! Lookup tables and the small enums they index
//!
//! Raw records store indices; these tables give them meaning. Decoding
//! clamps out-of-range indices into the table, encoding validates.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// CTCSS tones in tenths of Hz
pub const CTCSS_TONES: [u16; 50] = [
    670, 693, 719, 744, 770, 797, 825, 854, 885, 915, //
    948, 974, 1000, 1035, 1072, 1109, 1148, 1188, 1230, 1273, //
    1318, 1365, 1413, 1462, 1514, 1567, 1598, 1622, 1655, 1679, //
    1713, 1738, 1773, 1799, 1835, 1862, 1899, 1928, 1966, 1995, //
    2035, 2065, 2107, 2181, 2257, 2291, 2336, 2418, 2503, 2541,
];

/// DTCS codes, written with their octal digits (023 is stored as 23)
pub const DTCS_CODES: [u16; 104] = [
    23, 25, 26, 31, 32, 36, 43, 47, 51, 53, 54, //
    65, 71, 72, 73, 74, 114, 115, 116, 122, 125, 131, //
    132, 134, 143, 145, 152, 155, 156, 162, 165, 172, 174, //
    205, 212, 223, 225, 226, 243, 244, 245, 246, 251, 252, //
    255, 261, 263, 265, 266, 271, 274, 306, 311, 315, 325, //
    331, 332, 343, 346, 351, 356, 364, 365, 371, 411, 412, //
    413, 423, 431, 432, 445, 446, 452, 454, 455, 462, 464, //
    465, 466, 503, 506, 516, 523, 526, 532, 546, 565, 606, //
    612, 624, 627, 631, 632, 654, 662, 664, 703, 712, 723, //
    731, 732, 734, 743, 754,
];

/// Tuning steps in Hz
pub const TUNING_STEPS: [u32; 13] = [
    500, 1_000, 2_500, 5_000, 6_250, 10_000, 12_500, 15_000, 20_000, 25_000, 50_000, 100_000,
    500_000,
];

/// Fixed RX AGC gains in dB; the index after the last entry selects automatic gain
pub const AGC_GAINS_DB: [i8; 18] = [
    -43, -40, -38, -35, -33, -30, -28, -25, -23, -20, -18, -15, -13, -11, -9, -6, -4, -2,
];

/// Raw index meaning "automatic gain"
pub const AGC_AUTO_INDEX: u8 = AGC_GAINS_DB.len() as u8;

/// Index of a tuning step, nearest match
pub fn step_index(step_hz: u32) -> u8 {
    let mut best = 0;
    for (i, &s) in TUNING_STEPS.iter().enumerate() {
        if s.abs_diff(step_hz) < TUNING_STEPS[best].abs_diff(step_hz) {
            best = i;
        }
    }
    best as u8
}

/// Tuning step for a raw index, clamped to the table
pub fn step_from_index(index: u8) -> u32 {
    TUNING_STEPS[(index as usize).min(TUNING_STEPS.len() - 1)]
}

macro_rules! indexed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All values in raw index order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Value for a raw index, clamped to the last entry
            pub fn from_index(index: u8) -> Self {
                Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
            }

            /// Raw index of this value
            pub fn index(self) -> u8 {
                self as u8
            }

            /// Display label
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
                    .ok_or(Error::Validation(concat!("unknown ", stringify!($name))))
            }
        }
    };
}

indexed_enum! {
    /// Transmit power level
    PowerLevel {
        /// 1 W
        #[default]
        Low => "Low",
        /// 2.5 W
        Mid => "Mid",
        /// 5 W
        High => "High",
    }
}

impl PowerLevel {
    /// Nominal output in milliwatts
    pub fn milliwatts(self) -> u32 {
        match self {
            Self::Low => 1_000,
            Self::Mid => 2_500,
            Self::High => 5_000,
        }
    }
}

indexed_enum! {
    /// Demodulation mode
    Modulation {
        /// Narrow/wide FM
        #[default]
        Fm => "FM",
        /// AM
        Am => "AM",
        /// Lower sideband
        Lsb => "LSB",
        /// Upper sideband
        Usb => "USB",
        /// FM without audio filter
        Bypass => "BYP",
        /// Raw IF
        Raw => "RAW",
        /// Broadcast FM
        Wfm => "WFM",
        /// Preset
        Preset => "PRST",
    }
}

indexed_enum! {
    /// Receive filter bandwidth
    Bandwidth {
        /// 26 kHz
        #[default]
        W26k => "26k",
        /// 23 kHz
        W23k => "23k",
        /// 20 kHz
        W20k => "20k",
        /// 17 kHz
        W17k => "17k",
        /// 14 kHz
        W14k => "14k",
        /// 12 kHz
        W12k => "12k",
        /// 10 kHz
        N10k => "10k",
        /// 9 kHz
        N9k => "9k",
        /// 7 kHz
        U7k => "7k",
        /// 6 kHz
        U6k => "6k",
    }
}

indexed_enum! {
    /// Compander operation
    Compander {
        /// Disabled
        #[default]
        Off => "Off",
        /// Transmit only
        Tx => "TX",
        /// Receive only
        Rx => "RX",
        /// Both directions
        RxTx => "RX/TX",
    }
}

indexed_enum! {
    /// Battery pack fitted
    BatteryType {
        /// 1600 mAh
        #[default]
        Mah1600 => "1600mAh",
        /// 2200 mAh
        Mah2200 => "2200mAh",
        /// 3500 mAh
        Mah3500 => "3500mAh",
    }
}

/// RX AGC setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxAgc {
    /// Fixed front-end gain in dB
    Fixed(i8),
    /// Automatic gain control
    Auto,
}

impl Default for RxAgc {
    fn default() -> Self {
        Self::Fixed(AGC_GAINS_DB[0])
    }
}

impl RxAgc {
    /// Decode a raw index, clamping anything past the table to automatic
    pub fn from_index(index: u8) -> Self {
        match AGC_GAINS_DB.get(index as usize) {
            Some(&db) => Self::Fixed(db),
            None => Self::Auto,
        }
    }

    /// Raw index, rejecting gains not in the table
    pub fn index(self) -> Result<u8> {
        match self {
            Self::Auto => Ok(AGC_AUTO_INDEX),
            Self::Fixed(db) => AGC_GAINS_DB
                .iter()
                .position(|&g| g == db)
                .map(|i| i as u8)
                .ok_or(Error::UnsupportedAgcGain { db }),
        }
    }
}

impl fmt::Display for RxAgc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(db) => write!(f, "{}dB", db),
            Self::Auto => f.write_str("Auto"),
        }
    }
}

impl FromStr for RxAgc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let digits = s
            .strip_suffix("dB")
            .or_else(|| s.strip_suffix("db"))
            .unwrap_or(s);
        let db: i8 = digits
            .trim()
            .parse()
            .map_err(|_| Error::Validation("RX AGC must be Auto or a gain in dB"))?;
        let agc = Self::Fixed(db);
        agc.index()?;
        Ok(agc)
    }
}

// =============================================================================
// Tones
// =============================================================================

/// Raw code type stored next to each frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum CodeType {
    None = 0,
    Ctcss = 1,
    Dtcs = 2,
    DtcsInverted = 3,
}

/// Sub-audible squelch tone or code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    /// No tone
    #[default]
    None,
    /// CTCSS tone in tenths of Hz (885 = 88.5 Hz)
    Ctcss(u16),
    /// DTCS code, normal polarity
    Dtcs(u16),
    /// DTCS code, inverted polarity
    DtcsInverted(u16),
}

impl Tone {
    /// CTCSS tone from a frequency in Hz, rounded to 0.1 Hz
    pub fn ctcss_hz(hz: f32) -> Self {
        Self::Ctcss((hz * 10.0 + 0.5) as u16)
    }

    /// Decode a raw (code type, index) pair
    ///
    /// Unknown code types and out-of-table indices decode as no tone.
    pub fn decode(code_type: u8, index: u8) -> Self {
        let index = index as usize;
        match code_type {
            t if t == CodeType::Ctcss as u8 => CTCSS_TONES
                .get(index)
                .map_or(Self::None, |&t| Self::Ctcss(t)),
            t if t == CodeType::Dtcs as u8 => DTCS_CODES
                .get(index)
                .map_or(Self::None, |&c| Self::Dtcs(c)),
            t if t == CodeType::DtcsInverted as u8 => DTCS_CODES
                .get(index)
                .map_or(Self::None, |&c| Self::DtcsInverted(c)),
            _ => Self::None,
        }
    }

    /// Encode to a raw (code type, index) pair
    pub fn encode(self) -> Result<(u8, u8)> {
        match self {
            Self::None => Ok((CodeType::None as u8, 0)),
            Self::Ctcss(tenths) => CTCSS_TONES
                .iter()
                .position(|&t| t == tenths)
                .map(|i| (CodeType::Ctcss as u8, i as u8))
                .ok_or(Error::UnsupportedTone { tenths }),
            Self::Dtcs(code) => dtcs_index(code).map(|i| (CodeType::Dtcs as u8, i)),
            Self::DtcsInverted(code) => {
                dtcs_index(code).map(|i| (CodeType::DtcsInverted as u8, i))
            }
        }
    }
}

fn dtcs_index(code: u16) -> Result<u8> {
    DTCS_CODES
        .iter()
        .position(|&c| c == code)
        .map(|i| i as u8)
        .ok_or(Error::UnsupportedDtcs { code })
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Ctcss(t) => write!(f, "{}.{}", t / 10, t % 10),
            Self::Dtcs(c) => write!(f, "D{:03}N", c),
            Self::DtcsInverted(c) => write!(f, "D{:03}I", c),
        }
    }
}

impl FromStr for Tone {
    type Err = Error;

    /// Parse `-`/`off`, `88.5`, `D023`, `D023N` or `D023I`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("off") {
            return Ok(Self::None);
        }

        if let Some(rest) = s.strip_prefix('D').or_else(|| s.strip_prefix('d')) {
            let (digits, inverted) = match rest.as_bytes().last() {
                Some(b'I') | Some(b'i') => (&rest[..rest.len() - 1], true),
                Some(b'N') | Some(b'n') => (&rest[..rest.len() - 1], false),
                _ => (rest, false),
            };
            let code: u16 = digits
                .parse()
                .map_err(|_| Error::Validation("malformed DTCS code"))?;
            dtcs_index(code)?;
            return Ok(if inverted {
                Self::DtcsInverted(code)
            } else {
                Self::Dtcs(code)
            });
        }

        let hz: f32 = s
            .parse()
            .map_err(|_| Error::Validation("malformed CTCSS tone"))?;
        let tone = Self::ctcss_hz(hz);
        tone.encode()?;
        Ok(tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctcss_lookup() {
        assert_eq!(Tone::ctcss_hz(100.0).encode(), Ok((1, 12)));
        assert_eq!(Tone::Ctcss(670).encode(), Ok((1, 0)));
        assert_eq!(Tone::Ctcss(2541).encode(), Ok((1, 49)));
        assert_eq!(
            Tone::ctcss_hz(999.9).encode(),
            Err(Error::UnsupportedTone { tenths: 9999 })
        );
    }

    #[test]
    fn test_dtcs_lookup() {
        assert_eq!(Tone::Dtcs(754).encode(), Ok((2, 103)));
        assert_eq!(Tone::DtcsInverted(23).encode(), Ok((3, 0)));
        assert_eq!(
            Tone::Dtcs(24).encode(),
            Err(Error::UnsupportedDtcs { code: 24 })
        );
    }

    #[test]
    fn test_tone_decode_out_of_range_is_none() {
        assert_eq!(Tone::decode(1, 12), Tone::Ctcss(1000));
        assert_eq!(Tone::decode(1, 50), Tone::None);
        assert_eq!(Tone::decode(2, 104), Tone::None);
        assert_eq!(Tone::decode(3, 103), Tone::DtcsInverted(754));
        assert_eq!(Tone::decode(7, 0), Tone::None);
        assert_eq!(Tone::decode(0, 5), Tone::None);
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!("88.5".parse::<Tone>(), Ok(Tone::Ctcss(885)));
        assert_eq!("D023".parse::<Tone>(), Ok(Tone::Dtcs(23)));
        assert_eq!("d754i".parse::<Tone>(), Ok(Tone::DtcsInverted(754)));
        assert_eq!("off".parse::<Tone>(), Ok(Tone::None));
        assert!("D024".parse::<Tone>().is_err());
        assert!("999.9".parse::<Tone>().is_err());
    }

    #[test]
    fn test_step_nearest() {
        assert_eq!(step_index(12_500), 6);
        assert_eq!(step_index(8_330), 5);
        assert_eq!(step_index(6_000), 4);
        assert_eq!(step_index(0), 0);
        assert_eq!(step_index(1_000_000), 12);
        assert_eq!(step_from_index(6), 12_500);
        assert_eq!(step_from_index(15), 500_000);
    }

    #[test]
    fn test_enum_clamp() {
        assert_eq!(PowerLevel::from_index(3), PowerLevel::High);
        assert_eq!(Bandwidth::from_index(15), Bandwidth::U6k);
        assert_eq!(Modulation::from_index(2), Modulation::Lsb);
        assert_eq!("usb".parse::<Modulation>(), Ok(Modulation::Usb));
        assert_eq!("12k".parse::<Bandwidth>(), Ok(Bandwidth::W12k));
    }

    #[test]
    fn test_agc() {
        assert_eq!(RxAgc::from_index(0), RxAgc::Fixed(-43));
        assert_eq!(RxAgc::from_index(18), RxAgc::Auto);
        assert_eq!(RxAgc::from_index(63), RxAgc::Auto);
        assert_eq!(RxAgc::Fixed(-2).index(), Ok(17));
        assert_eq!(RxAgc::Fixed(-1).index(), Err(Error::UnsupportedAgcGain { db: -1 }));
        assert_eq!("-20dB".parse::<RxAgc>(), Ok(RxAgc::Fixed(-20)));
        assert_eq!("auto".parse::<RxAgc>(), Ok(RxAgc::Auto));
    }
}
