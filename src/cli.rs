//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a frequency in MHz ("145.5", "446.00625") into Hz
pub fn parse_mhz(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    if frac.len() > 6 || (int.is_empty() && frac.is_empty()) {
        return Err(format!("Invalid frequency: {}", s));
    }
    let digits_ok = |d: &str| d.bytes().all(|b| b.is_ascii_digit());
    if !digits_ok(int) || !digits_ok(frac) {
        return Err(format!("Invalid frequency: {}", s));
    }

    let mhz: u64 = if int.is_empty() {
        0
    } else {
        int.parse().map_err(|e| format!("Invalid frequency: {}", e))?
    };
    let frac_hz: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<6}", frac);
        padded
            .parse()
            .map_err(|e| format!("Invalid frequency: {}", e))?
    };
    mhz.checked_mul(1_000_000)
        .and_then(|hz| hz.checked_add(frac_hz))
        .ok_or_else(|| format!("Frequency out of range: {}", s))
}

#[derive(Parser)]
#[command(name = "uvkx")]
#[command(author, version, about = "UV-Kx radio programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Serial port options
#[derive(clap::Args, Debug, Clone)]
pub struct PortArgs {
    /// Serial port: a device path, dev=<path>[:<baud>], or "dummy"
    #[arg(short, long)]
    pub port: String,

    /// Baud rate (overrides any rate in the port string)
    #[arg(long)]
    pub baud: Option<u32>,

    /// Per-read timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    pub timeout_ms: u64,
}

/// Image layout selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutChoice {
    /// Detect from the settings version word
    #[default]
    Auto,
    /// Minimal firmware, 200 channels
    Minimal,
    /// Expanded firmware, 230 channels
    Expanded,
}

/// Image file options
#[derive(clap::Args, Debug, Clone)]
pub struct ImageArgs {
    /// Image file (8192 bytes)
    #[arg(short, long)]
    pub image: PathBuf,

    /// Image layout
    #[arg(short, long, value_enum, default_value_t = LayoutChoice::Auto)]
    pub layout: LayoutChoice,
}

/// Transmit offset mode
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplexChoice {
    /// Transmit on the receive frequency
    Simplex,
    /// Transmit above receive by --offset
    Plus,
    /// Transmit below receive by --offset
    Minus,
    /// Transmit on --offset as an absolute frequency
    Split,
    /// Never transmit
    Off,
}

/// Channel fields that can be changed from the command line
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChannelArgs {
    /// Receive frequency in MHz
    #[arg(short, long, value_parser = parse_mhz)]
    pub freq: Option<u64>,

    /// Transmit offset mode
    #[arg(long, value_enum)]
    pub duplex: Option<DuplexChoice>,

    /// Offset (plus/minus) or transmit frequency (split) in MHz
    #[arg(long, value_parser = parse_mhz)]
    pub offset: Option<u64>,

    /// Name, up to 10 ASCII characters
    #[arg(short, long)]
    pub name: Option<String>,

    /// Receive tone: "-", 88.5, D023N or D023I
    #[arg(long)]
    pub rx_tone: Option<String>,

    /// Transmit tone: "-", 88.5, D023N or D023I
    #[arg(long)]
    pub tx_tone: Option<String>,

    /// Power: Low, Mid or High
    #[arg(long)]
    pub power: Option<String>,

    /// Modulation: FM, AM, LSB, USB, BYP, RAW, WFM, PRST
    #[arg(long)]
    pub mode: Option<String>,

    /// Bandwidth: 26k, 23k, 20k, 17k, 14k, 12k, 10k, 9k, 7k, 6k
    #[arg(long)]
    pub bandwidth: Option<String>,

    /// Tuning step in kHz
    #[arg(long)]
    pub step: Option<f64>,

    /// Squelch level 0-15
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub squelch: Option<u8>,

    /// Compander: Off, TX, RX, RX/TX
    #[arg(long)]
    pub compander: Option<String>,

    /// RX AGC: Auto or a gain such as -20dB
    #[arg(long, allow_hyphen_values = true)]
    pub rx_agc: Option<String>,

    /// Repeater squelch tail elimination (on/off)
    #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
    pub tx_ste: Option<bool>,

    /// Squelch tail elimination (on/off)
    #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
    pub rx_ste: Option<bool>,

    /// Roger beep mode 0-15
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub roger: Option<u8>,

    /// PTT-ID mode 0-15
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub ptt_id: Option<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the radio's EEPROM into an image file
    Download {
        #[command(flatten)]
        port: PortArgs,

        /// Output image file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an image file to the radio
    Upload {
        #[command(flatten)]
        port: PortArgs,

        /// Input image file
        #[arg(short, long)]
        input: PathBuf,

        /// Image layout
        #[arg(short, long, value_enum, default_value_t = LayoutChoice::Auto)]
        layout: LayoutChoice,

        /// Do not write the calibration area
        #[arg(long)]
        protect_calibration: bool,
    },

    /// Identify the radio
    Info {
        #[command(flatten)]
        port: PortArgs,
    },

    /// List channels in an image
    Channels {
        #[command(flatten)]
        image: ImageArgs,

        /// Also show empty slots
        #[arg(short, long)]
        all: bool,
    },

    /// Show the settings record of an image
    Settings {
        #[command(flatten)]
        image: ImageArgs,
    },

    /// Create or modify a channel in an image
    SetChannel {
        #[command(flatten)]
        image: ImageArgs,

        /// Channel number (1-based)
        index: u16,

        #[command(flatten)]
        fields: ChannelArgs,
    },

    /// Empty a channel slot in an image
    ClearChannel {
        #[command(flatten)]
        image: ImageArgs,

        /// Channel number (1-based)
        index: u16,
    },

    /// Change one setting in an image
    SetSetting {
        #[command(flatten)]
        image: ImageArgs,

        /// Setting name (see the `settings` command output)
        name: String,

        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mhz() {
        assert_eq!(parse_mhz("145.5"), Ok(145_500_000));
        assert_eq!(parse_mhz("446.00625"), Ok(446_006_250));
        assert_eq!(parse_mhz("7"), Ok(7_000_000));
        assert_eq!(parse_mhz(".6"), Ok(600_000));
        assert!(parse_mhz("145.1234567").is_err());
        assert!(parse_mhz("abc").is_err());
        assert!(parse_mhz("-1").is_err());
        assert!(parse_mhz(".").is_err());
    }

    #[test]
    fn test_set_channel_ste_and_roger() {
        let cli = Cli::try_parse_from([
            "uvkx", "set-channel", "-i", "radio.img", "5", "--tx-ste", "on", "--rx-ste", "off",
            "--roger", "2", "--ptt-id", "1",
        ])
        .unwrap();
        let Commands::SetChannel { index, fields, .. } = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(index, 5);
        assert_eq!(fields.tx_ste, Some(true));
        assert_eq!(fields.rx_ste, Some(false));
        assert_eq!(fields.roger, Some(2));
        assert_eq!(fields.ptt_id, Some(1));

        let too_high = ["uvkx", "set-channel", "-i", "x", "1", "--roger", "16"];
        assert!(Cli::try_parse_from(too_high).is_err());
    }
}
