//! Raw EEPROM image

use core::fmt;
use core::ops::Range;

use crate::error::{Error, Result};
use crate::layout::{LayoutVersion, BLOCK_SIZE, IMAGE_SIZE};

/// The full 8 KiB EEPROM image, exclusively owned by its holder
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    data: [u8; IMAGE_SIZE],
}

impl RawImage {
    /// A zero-filled image
    pub const fn new() -> Self {
        Self {
            data: [0; IMAGE_SIZE],
        }
    }

    /// Copy an image from a buffer, which must be exactly [`IMAGE_SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != IMAGE_SIZE {
            return Err(Error::ImageSize {
                expected: IMAGE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut image = Self::new();
        image.data.copy_from_slice(bytes);
        Ok(image)
    }

    /// Image contents
    pub fn as_bytes(&self) -> &[u8; IMAGE_SIZE] {
        &self.data
    }

    /// Mutable image contents
    pub fn as_bytes_mut(&mut self) -> &mut [u8; IMAGE_SIZE] {
        &mut self.data
    }

    /// Range of the transfer block starting at `offset`, clipped to `limit`
    /// and the image end
    pub fn block_range(offset: usize, limit: usize) -> Range<usize> {
        let end = (offset + BLOCK_SIZE).min(limit).min(IMAGE_SIZE);
        offset.min(end)..end
    }

    /// Guess the layout from the settings version word
    pub fn detect_layout(&self) -> LayoutVersion {
        LayoutVersion::detect(&self.data)
    }
}

impl Default for RawImage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0 && b != 0xFF).count();
        f.debug_struct("RawImage")
            .field("size", &IMAGE_SIZE)
            .field("used_bytes", &used)
            .finish()
    }
}

impl AsRef<[u8]> for RawImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_checks_size() {
        assert_eq!(
            RawImage::from_bytes(&[0u8; 100]),
            Err(Error::ImageSize {
                expected: IMAGE_SIZE,
                actual: 100
            })
        );
        let mut buf = [0u8; IMAGE_SIZE];
        buf[0x1FFF] = 0x42;
        let image = RawImage::from_bytes(&buf).unwrap();
        assert_eq!(image.as_bytes()[0x1FFF], 0x42);
    }

    #[test]
    fn test_block_range() {
        assert_eq!(RawImage::block_range(0, IMAGE_SIZE), 0..0x80);
        assert_eq!(RawImage::block_range(0x1F80, IMAGE_SIZE), 0x1F80..0x2000);
        assert_eq!(RawImage::block_range(0x1D80, 0x1E00), 0x1D80..0x1E00);
        assert_eq!(RawImage::block_range(0x1DD0, 0x1E00), 0x1DD0..0x1E00);
        assert!(RawImage::block_range(0x1E00, 0x1E00).is_empty());
    }
}
