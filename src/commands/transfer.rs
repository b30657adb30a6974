//! Radio transfer commands

use std::path::Path;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use uvkx_core::TransferProgress;
use uvkx_dummy::DummyRadio;
use uvkx_serial::{self as serial, Radio, SerialConnection, Transport, UploadOptions};

use super::{load_image, resolve_layout, save_image};
use crate::cli::{LayoutChoice, PortArgs};

/// Create a progress bar with a phase message
fn create_progress_bar_with_phase(
    total: u64,
    phase: &str,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Progress reporter using indicatif progress bars, one bar per phase
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
    phase: String,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
            phase: String::new(),
        }
    }

    fn create_bar(&mut self, total: u64, phase: &str) {
        self.finish();
        self.phase = phase.to_string();
        let pb = self.multi.add(
            create_progress_bar_with_phase(total, phase)
                .unwrap_or_else(|_| ProgressBar::new(total)),
        );
        self.current_bar = Some(pb);
    }

    fn finish(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish();
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

impl TransferProgress for IndicatifProgress {
    fn update(&mut self, current: usize, max: usize, message: &str) {
        if self.current_bar.is_none() || self.phase != message {
            self.create_bar(max as u64, message);
        }
        if let Some(pb) = &self.current_bar {
            pb.set_position(current as u64);
        }
    }
}

/// Open the port named on the command line
pub fn open_radio(args: &PortArgs) -> Result<Radio<Box<dyn Transport>>, Box<dyn std::error::Error>> {
    let transport: Box<dyn Transport> = if args.port == "dummy" {
        log::info!("Using emulated radio");
        Box::new(DummyRadio::new_default())
    } else {
        let mut conn = SerialConnection::parse(&args.port)?;
        if args.baud.is_some() {
            conn.baud = args.baud;
        }
        Box::new(conn.open()?)
    };

    let mut radio = Radio::new(transport);
    radio.set_timeout(Duration::from_millis(args.timeout_ms))?;
    Ok(radio)
}

/// Run the download command
pub fn run_download(port: &PortArgs, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut radio = open_radio(port)?;
    let image = {
        let mut progress = IndicatifProgress::new();
        serial::download(&mut radio, &mut progress)?
    };
    if let Some(fw) = radio.firmware() {
        println!("Firmware: {}", fw);
    }
    println!("Detected layout: {}", image.detect_layout());
    save_image(output, &image)
}

/// Run the upload command
pub fn run_upload(
    port: &PortArgs,
    input: &Path,
    layout: LayoutChoice,
    protect_calibration: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(input)?;
    let layout = resolve_layout(layout, &image);
    let options = UploadOptions {
        protect_calibration,
    };

    let mut radio = open_radio(port)?;
    let uploaded = {
        let mut progress = IndicatifProgress::new();
        serial::upload(&mut radio, &image, layout, options, &mut progress)?
    };

    if !uploaded {
        return Err("Radio did not report a firmware version, nothing was uploaded".into());
    }
    println!("Upload complete ({} layout), radio is restarting", layout);
    Ok(())
}

/// Run the info command
pub fn run_info(port: &PortArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut radio = open_radio(port)?;
    let firmware = radio.handshake()?;
    println!("Firmware: {}", firmware);
    Ok(())
}
