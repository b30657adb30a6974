//! Payload obfuscation
//!
//! Every command and reply body is XORed with a fixed 16-byte key before it
//! goes on the wire. This is scrambling, not security: the transform is its
//! own inverse.

/// Fixed XOR key table
pub const OBFUSCATION_KEY: [u8; 16] = [
    0x16, 0x6C, 0x14, 0xE6, 0x2E, 0x91, 0x0D, 0x40, 0x21, 0x35, 0xD5, 0x40, 0x13, 0x03, 0xE9, 0x80,
];

/// Obfuscate (or de-obfuscate) a buffer in place
///
/// Key position restarts at zero for every call, matching how the radio
/// treats each frame payload independently.
pub fn obfuscate_in_place(data: &mut [u8]) {
    for (byte, key) in data.iter_mut().zip(OBFUSCATION_KEY.iter().cycle()) {
        *byte ^= key;
    }
}

/// Obfuscate `input` into `output`
///
/// `output` must be at least as long as `input`; extra bytes are untouched.
pub fn obfuscate(input: &[u8], output: &mut [u8]) {
    let out = &mut output[..input.len()];
    out.copy_from_slice(input);
    obfuscate_in_place(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obfuscate_is_involution() {
        let original: [u8; 40] = core::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(5));
        let mut data = original;
        obfuscate_in_place(&mut data);
        assert_ne!(data, original);
        obfuscate_in_place(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_obfuscate_key_wraps() {
        let mut zeros = [0u8; 33];
        obfuscate_in_place(&mut zeros);
        assert_eq!(&zeros[..16], &OBFUSCATION_KEY);
        assert_eq!(&zeros[16..32], &OBFUSCATION_KEY);
        assert_eq!(zeros[32], OBFUSCATION_KEY[0]);
    }

    #[test]
    fn test_obfuscate_copy() {
        let input = [0x14, 0x05, 0x04, 0x00];
        let mut out = [0xAAu8; 6];
        obfuscate(&input, &mut out);
        assert_eq!(out[0], 0x14 ^ 0x16);
        assert_eq!(out[1], 0x05 ^ 0x6C);
        assert_eq!(&out[4..], &[0xAA, 0xAA]);
    }
}
