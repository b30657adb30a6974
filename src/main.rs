//! uvkx - UV-Kx handheld radio programmer
//!
//! Downloads and uploads the radio's 8 KiB EEPROM over its serial
//! programming cable, and edits channels and settings in saved images.
//!
//! # Architecture
//!
//! - `uvkx-core` holds the frame format and the image codec, free of I/O
//! - `uvkx-serial` runs the protocol over a serial port
//! - `uvkx-dummy` emulates a radio, selected with `--port dummy`

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Download { port, output } => commands::transfer::run_download(&port, &output),
        Commands::Upload {
            port,
            input,
            layout,
            protect_calibration,
        } => commands::transfer::run_upload(&port, &input, layout, protect_calibration),
        Commands::Info { port } => commands::transfer::run_info(&port),
        Commands::Channels { image, all } => commands::channels::run_list(&image, all),
        Commands::Settings { image } => commands::settings::run_show(&image),
        Commands::SetChannel {
            image,
            index,
            fields,
        } => commands::channels::run_set(&image, index, &fields),
        Commands::ClearChannel { image, index } => commands::channels::run_clear(&image, index),
        Commands::SetSetting { image, name, value } => {
            commands::settings::run_set(&image, &name, &value)
        }
    }
}
