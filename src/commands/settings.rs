//! Settings display and editing

use uvkx_core::layout::{BatteryType, ExpandedSettings, MinimalSettings};
use uvkx_core::{decode_settings, encode_settings, Settings};

use super::channels::format_mhz;
use super::{open_image, save_image};
use crate::cli::ImageArgs;

fn print_minimal(s: &MinimalSettings) {
    println!("call_channel     {}", s.call_channel);
    println!("max_talk_time    {}", s.max_talk_time);
    println!("tx_deviation     {}", s.tx_deviation);
    println!("key_lock         {}", s.key_lock);
    println!("vox              {}", s.vox);
    println!("vox_level        {}", s.vox_level);
    println!("mic_gain         {}", s.mic_gain);
}

fn print_expanded(s: &ExpandedSettings) {
    println!("version          0x{:04X}", s.version);
    println!("battery_type     {}", s.battery_type);
    println!("busy_lockout     {}", s.busy_lockout);
    println!("beep             {}", s.beep);
    println!("backlight_level  {}", s.backlight_level);
    println!("backlight_time   {}", s.backlight_time);
    println!("backlight_mode   {}", s.backlight_mode);
    println!("mic_gain         {}", s.mic_gain);
    println!("lcd_contrast     {}", s.lcd_contrast);
    println!("tx_timeout       {}", s.tx_timeout);
    println!("battery_save     {}", s.battery_save);
    for (i, name) in ["a", "b"].iter().enumerate() {
        println!("vfo_{}_select     {}", name, s.vfo_select[i]);
        println!("channel_{}        {}", name, s.channel[i]);
        match &s.vfo[i] {
            Some(ch) => println!(
                "  VFO {}: {} MHz {} {}",
                name.to_uppercase(),
                format_mhz(ch.rx_freq),
                ch.modulation,
                ch.name
            ),
            None => println!("  VFO {}: (empty)", name.to_uppercase()),
        }
    }
}

/// Run the settings command
pub fn run_show(args: &ImageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (image, layout) = open_image(args)?;
    println!("Layout: {}", layout);
    println!();
    match decode_settings(&image, layout) {
        Settings::Minimal(s) => print_minimal(&s),
        Settings::Expanded(s) => print_expanded(&s),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(format!("Invalid boolean: {}", value)),
    }
}

fn parse_num<T: std::str::FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid number: {}", value))
}

fn set_minimal(s: &mut MinimalSettings, name: &str, value: &str) -> Result<(), String> {
    match name {
        "call_channel" => s.call_channel = parse_num(value)?,
        "max_talk_time" => s.max_talk_time = parse_num(value)?,
        "tx_deviation" => s.tx_deviation = parse_num(value)?,
        "key_lock" => s.key_lock = parse_bool(value)?,
        "vox" => s.vox = parse_bool(value)?,
        "vox_level" => s.vox_level = parse_num(value)?,
        "mic_gain" => s.mic_gain = parse_num(value)?,
        _ => return Err(format!("Unknown setting for minimal layout: {}", name)),
    }
    Ok(())
}

fn set_nibble(field: &mut u8, value: &str, max: u8) -> Result<(), String> {
    let v: u8 = parse_num(value)?;
    if v > max {
        return Err(format!("Value {} out of range (0-{})", v, max));
    }
    *field = v;
    Ok(())
}

fn set_expanded(s: &mut ExpandedSettings, name: &str, value: &str) -> Result<(), String> {
    match name {
        "battery_type" => {
            s.battery_type = value
                .parse::<BatteryType>()
                .map_err(|e| e.to_string())?
        }
        "busy_lockout" => s.busy_lockout = parse_bool(value)?,
        "beep" => s.beep = parse_bool(value)?,
        "backlight_level" => set_nibble(&mut s.backlight_level, value, 15)?,
        "backlight_time" => set_nibble(&mut s.backlight_time, value, 15)?,
        "backlight_mode" => set_nibble(&mut s.backlight_mode, value, 3)?,
        "mic_gain" => set_nibble(&mut s.mic_gain, value, 14)?,
        "lcd_contrast" => set_nibble(&mut s.lcd_contrast, value, 15)?,
        "tx_timeout" => set_nibble(&mut s.tx_timeout, value, 15)?,
        "battery_save" => set_nibble(&mut s.battery_save, value, 15)?,
        "vfo_a_select" => s.vfo_select[0] = parse_bool(value)?,
        "vfo_b_select" => s.vfo_select[1] = parse_bool(value)?,
        "channel_a" => s.channel[0] = parse_num(value)?,
        "channel_b" => s.channel[1] = parse_num(value)?,
        _ => return Err(format!("Unknown setting for expanded layout: {}", name)),
    }
    Ok(())
}

/// Apply one named setting
pub fn apply_setting(settings: &mut Settings, name: &str, value: &str) -> Result<(), String> {
    let name = name.replace('-', "_");
    match settings {
        Settings::Minimal(s) => set_minimal(s, &name, value),
        Settings::Expanded(s) => set_expanded(s, &name, value),
    }
}

/// Run the set-setting command
pub fn run_set(args: &ImageArgs, name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (mut image, layout) = open_image(args)?;
    let mut settings = decode_settings(&image, layout);
    apply_setting(&mut settings, name, value)?;
    encode_settings(&mut image, &settings, layout)?;
    println!("Set {} = {}", name, value);
    save_image(&args.image, &image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_minimal() {
        let mut s = Settings::Minimal(MinimalSettings::default());
        apply_setting(&mut s, "call-channel", "12").unwrap();
        apply_setting(&mut s, "vox", "on").unwrap();
        assert!(apply_setting(&mut s, "beep", "on").is_err());
        let Settings::Minimal(m) = s else {
            panic!("wrong variant");
        };
        assert_eq!(m.call_channel, 12);
        assert!(m.vox);
    }

    #[test]
    fn test_apply_expanded() {
        let mut s = Settings::Expanded(ExpandedSettings::default());
        apply_setting(&mut s, "battery_type", "2200mAh").unwrap();
        apply_setting(&mut s, "channel_b", "42").unwrap();
        assert!(apply_setting(&mut s, "backlight_mode", "4").is_err());
        assert!(apply_setting(&mut s, "beep", "maybe").is_err());
        let Settings::Expanded(e) = s else {
            panic!("wrong variant");
        };
        assert_eq!(e.battery_type, BatteryType::Mah2200);
        assert_eq!(e.channel, [1, 42]);
    }
}
