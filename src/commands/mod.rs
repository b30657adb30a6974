//! CLI command implementations
//!
//! Transfer commands talk to a radio through a port; the remaining commands
//! edit an image file on disk with the codec in `uvkx-core`.

pub mod channels;
pub mod settings;
pub mod transfer;

use std::fs;
use std::path::Path;

use uvkx_core::{LayoutVersion, RawImage};

use crate::cli::{ImageArgs, LayoutChoice};

/// Read an image file
pub fn load_image(path: &Path) -> Result<RawImage, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    let image = RawImage::from_bytes(&data)?;
    log::debug!("Read {} bytes from {:?}", data.len(), path);
    Ok(image)
}

/// Write an image file
pub fn save_image(path: &Path, image: &RawImage) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, image.as_bytes())?;
    println!("Wrote {} bytes to {:?}", image.as_bytes().len(), path);
    Ok(())
}

/// Pick the layout for an image
pub fn resolve_layout(choice: LayoutChoice, image: &RawImage) -> LayoutVersion {
    match choice {
        LayoutChoice::Minimal => LayoutVersion::Minimal,
        LayoutChoice::Expanded => LayoutVersion::Expanded,
        LayoutChoice::Auto => {
            let layout = image.detect_layout();
            log::info!("Detected {} layout", layout);
            layout
        }
    }
}

/// Load the image named by `args` together with its layout
pub fn open_image(
    args: &ImageArgs,
) -> Result<(RawImage, LayoutVersion), Box<dyn std::error::Error>> {
    let image = load_image(&args.image)?;
    let layout = resolve_layout(args.layout, &image);
    Ok((image, layout))
}
