//! Channel listing and editing

use uvkx_core::layout::tables::{step_index, TUNING_STEPS};
use uvkx_core::layout::{Bandwidth, Compander, Modulation, PowerLevel, RxAgc, Tone};
use uvkx_core::{
    clear_channel, decode_channel, encode_channel, Channel, Duplex, LayoutVersion, RawImage,
};

use super::{open_image, save_image};
use crate::cli::{ChannelArgs, DuplexChoice, ImageArgs};

/// Format a frequency in Hz as MHz
pub fn format_mhz(hz: u64) -> String {
    format!("{}.{:06}", hz / 1_000_000, hz % 1_000_000)
}

fn format_duplex(duplex: Duplex) -> String {
    match duplex {
        Duplex::Simplex => String::new(),
        Duplex::Plus(off) => format!("+{}", format_mhz(off)),
        Duplex::Minus(off) => format!("-{}", format_mhz(off)),
        Duplex::Split(tx) => format!("split {}", format_mhz(tx)),
        Duplex::Off => "off".to_string(),
    }
}

fn print_header() {
    println!(
        "{:>4} {:<10} {:>11} {:<16} {:>6} {:>6} {:<5} {:<4} {:<4} {:>4}",
        "Ch", "Name", "RX MHz", "Duplex", "RX", "TX", "Mode", "BW", "Pwr", "Sql"
    );
    println!("{}", "-".repeat(80));
}

fn print_channel(index: u16, ch: &Channel) {
    println!(
        "{:>4} {:<10} {:>11} {:<16} {:>6} {:>6} {:<5} {:<4} {:<4} {:>4}",
        index,
        ch.name,
        format_mhz(ch.rx_freq),
        format_duplex(ch.duplex),
        ch.rx_tone.to_string(),
        ch.tx_tone.to_string(),
        ch.modulation.label(),
        ch.bandwidth.label(),
        ch.power.label(),
        ch.squelch
    );
}

/// Run the channels command
pub fn run_list(args: &ImageArgs, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (image, layout) = open_image(args)?;
    print_header();

    let mut used = 0;
    for index in 1..=layout.chan_max() {
        match decode_channel(&image, index, layout)? {
            Some(ch) => {
                used += 1;
                print_channel(index, &ch);
            }
            None if all => println!("{:>4} {:<10}", index, "(empty)"),
            None => {}
        }
    }

    println!();
    println!("{} of {} channels in use", used, layout.chan_max());
    Ok(())
}

fn parse_field<T: std::str::FromStr<Err = uvkx_core::Error>>(
    value: &Option<String>,
) -> Result<Option<T>, uvkx_core::Error> {
    value.as_deref().map(str::parse).transpose()
}

/// Apply command-line fields to a channel
pub fn apply_fields(
    ch: &mut Channel,
    fields: &ChannelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(freq) = fields.freq {
        ch.rx_freq = freq;
    }
    if let Some(name) = &fields.name {
        ch.set_name(name)?;
    }

    match (fields.duplex, fields.offset) {
        (Some(DuplexChoice::Simplex), _) => ch.duplex = Duplex::Simplex,
        (Some(DuplexChoice::Off), _) => ch.duplex = Duplex::Off,
        (Some(DuplexChoice::Plus), Some(off)) => ch.duplex = Duplex::Plus(off),
        (Some(DuplexChoice::Minus), Some(off)) => ch.duplex = Duplex::Minus(off),
        (Some(DuplexChoice::Split), Some(tx)) => ch.duplex = Duplex::Split(tx),
        (Some(_), None) => return Err("--offset is required for plus, minus and split".into()),
        (None, Some(off)) => {
            ch.duplex = match ch.duplex {
                Duplex::Plus(_) => Duplex::Plus(off),
                Duplex::Minus(_) => Duplex::Minus(off),
                Duplex::Split(_) => Duplex::Split(off),
                _ => return Err("--offset needs --duplex on a simplex channel".into()),
            }
        }
        (None, None) => {}
    }

    if let Some(tone) = parse_field::<Tone>(&fields.rx_tone)? {
        ch.rx_tone = tone;
    }
    if let Some(tone) = parse_field::<Tone>(&fields.tx_tone)? {
        ch.tx_tone = tone;
    }
    if let Some(power) = parse_field::<PowerLevel>(&fields.power)? {
        ch.power = power;
    }
    if let Some(mode) = parse_field::<Modulation>(&fields.mode)? {
        ch.modulation = mode;
    }
    if let Some(bw) = parse_field::<Bandwidth>(&fields.bandwidth)? {
        ch.bandwidth = bw;
    }
    if let Some(c) = parse_field::<Compander>(&fields.compander)? {
        ch.compander = c;
    }
    if let Some(agc) = parse_field::<RxAgc>(&fields.rx_agc)? {
        ch.rx_agc = agc;
    }
    if let Some(khz) = fields.step {
        let hz = (khz * 1000.0).round().max(0.0) as u32;
        let step = TUNING_STEPS[step_index(hz) as usize];
        if step != hz {
            log::warn!("Step {} Hz not available, using {} Hz", hz, step);
        }
        ch.step = step;
    }
    if let Some(sql) = fields.squelch {
        ch.squelch = sql;
    }
    if let Some(ste) = fields.tx_ste {
        ch.tx_ste = ste;
    }
    if let Some(ste) = fields.rx_ste {
        ch.rx_ste = ste;
    }
    if let Some(roger) = fields.roger {
        ch.roger = roger;
    }
    if let Some(ptt_id) = fields.ptt_id {
        ch.ptt_id = ptt_id;
    }
    Ok(())
}

/// Build the new contents of slot `index`
pub fn edit_channel(
    image: &RawImage,
    index: u16,
    layout: LayoutVersion,
    fields: &ChannelArgs,
) -> Result<Channel, Box<dyn std::error::Error>> {
    let mut ch = match decode_channel(image, index, layout)? {
        Some(ch) => ch,
        None => {
            let freq = fields
                .freq
                .ok_or("channel is empty, --freq is required")?;
            let mut ch = Channel::new(freq);
            ch.number = index;
            ch
        }
    };
    apply_fields(&mut ch, fields)?;
    Ok(ch)
}

/// Run the set-channel command
pub fn run_set(
    args: &ImageArgs,
    index: u16,
    fields: &ChannelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut image, layout) = open_image(args)?;
    let ch = edit_channel(&image, index, layout, fields)?;
    encode_channel(&mut image, index, Some(&ch), layout)?;

    print_header();
    print_channel(index, &ch);
    save_image(&args.image, &image)
}

/// Run the clear-channel command
pub fn run_clear(args: &ImageArgs, index: u16) -> Result<(), Box<dyn std::error::Error>> {
    let (mut image, layout) = open_image(args)?;
    clear_channel(&mut image, index, layout)?;
    println!("Cleared channel {}", index);
    save_image(&args.image, &image)
}
