//! Whole-image download and upload

use uvkx_core::layout::{LayoutVersion, BLOCK_SIZE, CALIBRATION_START, IMAGE_SIZE};
use uvkx_core::{RawImage, TransferProgress};

use crate::device::Radio;
use crate::error::{InitFailure, RadioError, Result};
use crate::transport::Transport;

/// Upload options
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    /// Never write at or above the calibration area
    pub protect_calibration: bool,
}

/// Read the whole EEPROM
///
/// Any short or missing block aborts the download.
pub fn download<T: Transport, P: TransferProgress + ?Sized>(
    radio: &mut Radio<T>,
    progress: &mut P,
) -> Result<RawImage> {
    radio.handshake()?;

    let mut image = RawImage::new();
    for offset in (0..IMAGE_SIZE).step_by(BLOCK_SIZE) {
        let data = radio.read_block(offset as u16, BLOCK_SIZE as u8)?;
        image.as_bytes_mut()[offset..offset + BLOCK_SIZE].copy_from_slice(&data);
        progress.update(offset + BLOCK_SIZE, IMAGE_SIZE, "Downloading from radio");
    }

    log::info!("Downloaded {} bytes", IMAGE_SIZE);
    Ok(image)
}

/// Write an image back in the three ranges of `layout`, then reset the radio
///
/// Returns `Ok(false)` without writing anything when the radio answers the
/// hello without a firmware string.
pub fn upload<T: Transport, P: TransferProgress + ?Sized>(
    radio: &mut Radio<T>,
    image: &RawImage,
    layout: LayoutVersion,
    options: UploadOptions,
    progress: &mut P,
) -> Result<bool> {
    match radio.handshake() {
        Ok(_) => {}
        Err(RadioError::Initialization(InitFailure::EmptyFirmware)) => {
            log::warn!("Radio did not identify itself, nothing uploaded");
            return Ok(false);
        }
        Err(e) => return Err(e),
    }

    let limit = if options.protect_calibration {
        CALIBRATION_START
    } else {
        IMAGE_SIZE
    };

    for phase in layout.upload_phases() {
        let start = phase.range.start;
        let end = phase.range.end.min(limit);
        log::debug!("{}: 0x{:04X}..0x{:04X}", phase.message, start, end);

        let mut addr = start;
        while addr < end {
            let block = RawImage::block_range(addr, limit);
            if block.is_empty() {
                return Err(RadioError::IncompleteTransfer {
                    offset: addr,
                    expected: BLOCK_SIZE,
                    actual: 0,
                });
            }
            radio.write_block(addr as u16, &image.as_bytes()[block.clone()])?;
            addr = block.end;
            progress.update((addr - start).min(end - start), end - start, phase.message);
        }
    }

    radio.reset()?;
    log::info!("Upload complete ({} layout)", layout);
    Ok(true)
}
