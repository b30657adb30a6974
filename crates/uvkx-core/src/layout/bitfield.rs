//! Sub-byte field accessors
//!
//! Record layouts are described as data: each field is a byte offset, a bit
//! position and a width, read from a little-endian window over the record.
//! This reproduces the firmware's packed C bitfields exactly, including the
//! 27-bit frequency that shares a word with the 4-bit code type.

/// A bit-packed field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Byte offset of the field's first byte within the record
    pub offset: usize,
    /// Bit position of the field's LSB within the little-endian window
    pub shift: u8,
    /// Width in bits (1..=32)
    pub width: u8,
}

impl BitField {
    /// Create a field description
    pub const fn new(offset: usize, shift: u8, width: u8) -> Self {
        Self {
            offset,
            shift,
            width,
        }
    }

    /// A whole byte
    pub const fn byte(offset: usize) -> Self {
        Self::new(offset, 0, 8)
    }

    /// A little-endian u16
    pub const fn u16le(offset: usize) -> Self {
        Self::new(offset, 0, 16)
    }

    /// A single bit
    pub const fn bit(offset: usize, bit: u8) -> Self {
        Self::new(offset, bit, 1)
    }

    /// Largest value the field can hold
    pub const fn max(self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Number of bytes the field touches
    const fn span(self) -> usize {
        (self.shift as usize + self.width as usize).div_ceil(8)
    }

    fn window(self, record: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        let span = self.span();
        raw[..span].copy_from_slice(&record[self.offset..self.offset + span]);
        u64::from_le_bytes(raw)
    }

    /// Read the field from a record
    pub fn get(self, record: &[u8]) -> u32 {
        ((self.window(record) >> self.shift) & self.max() as u64) as u32
    }

    /// Write the field into a record, saturating to the field maximum
    ///
    /// Bits outside the field are preserved.
    pub fn set(self, record: &mut [u8], value: u32) {
        let value = value.min(self.max()) as u64;
        let mask = (self.max() as u64) << self.shift;
        let window = (self.window(record) & !mask) | (value << self.shift);

        let span = self.span();
        record[self.offset..self.offset + span].copy_from_slice(&window.to_le_bytes()[..span]);
    }

    /// Read a one-bit (or wider) field as a flag
    pub fn get_bool(self, record: &[u8]) -> bool {
        self.get(record) != 0
    }

    /// Write a flag
    pub fn set_bool(self, record: &mut [u8], value: bool) {
        self.set(record, value as u32);
    }
}

/// Two 4-bit fields sharing one byte
///
/// `swapped == false` puts the first-declared field in the high nibble (the
/// MSB-first declaration order). `swapped == true` puts it in the low nibble,
/// which is how the expanded firmware's packed structs land in EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NibblePair {
    /// Byte offset within the record
    pub offset: usize,
    /// Whether the first-declared field lives in the low nibble
    pub swapped: bool,
}

impl NibblePair {
    /// Describe a nibble pair
    pub const fn new(offset: usize, swapped: bool) -> Self {
        Self { offset, swapped }
    }

    /// The first-declared field
    pub const fn first(self) -> BitField {
        BitField::new(self.offset, if self.swapped { 0 } else { 4 }, 4)
    }

    /// The second-declared field
    pub const fn second(self) -> BitField {
        BitField::new(self.offset, if self.swapped { 4 } else { 0 }, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_word_split() {
        // 27-bit frequency, 4-bit code type in bits 27..31, bit 31 spare
        let freq = BitField::new(0, 0, 27);
        let code_type = BitField::new(3, 3, 4);
        let mut rec = [0u8; 5];

        freq.set(&mut rec, 14_550_000);
        code_type.set(&mut rec, 2);
        let word = u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
        assert_eq!(word & 0x07FF_FFFF, 14_550_000);
        assert_eq!((word >> 27) & 0xF, 2);

        assert_eq!(freq.get(&rec), 14_550_000);
        assert_eq!(code_type.get(&rec), 2);
        assert_eq!(rec[4], 0);
    }

    #[test]
    fn test_set_preserves_neighbours() {
        let mut rec = [0xFFu8; 2];
        BitField::new(0, 2, 2).set(&mut rec, 0);
        assert_eq!(rec, [0xF3, 0xFF]);
        BitField::new(0, 6, 4).set(&mut rec, 0b0101);
        assert_eq!(rec, [0x73, 0xFD]);
        assert_eq!(BitField::new(0, 6, 4).get(&rec), 0b0101);
    }

    #[test]
    fn test_set_saturates() {
        let mut rec = [0u8; 4];
        let f = BitField::new(0, 0, 27);
        f.set(&mut rec, u32::MAX);
        assert_eq!(f.get(&rec), 0x07FF_FFFF);
        assert_eq!(rec[3], 0x07);
    }

    #[test]
    fn test_nibble_pair_orders() {
        let mut rec = [0u8; 1];
        let swapped = NibblePair::new(0, true);
        swapped.first().set(&mut rec, 0x3);
        swapped.second().set(&mut rec, 0xA);
        assert_eq!(rec[0], 0xA3);

        let plain = NibblePair::new(0, false);
        assert_eq!(plain.first().get(&rec), 0xA);
        assert_eq!(plain.second().get(&rec), 0x3);
    }

    #[test]
    fn test_u16_and_bits() {
        let mut rec = [0u8; 3];
        BitField::u16le(1).set(&mut rec, 0x1234);
        assert_eq!(rec, [0x00, 0x34, 0x12]);
        BitField::bit(0, 7).set_bool(&mut rec, true);
        assert_eq!(rec[0], 0x80);
        assert!(BitField::bit(0, 7).get_bool(&rec));
        assert!(!BitField::bit(0, 6).get_bool(&rec));
    }
}
