//! Man page generator for uvkx
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Writes `uvkx.1` plus one `uvkx-<command>.1` page per subcommand.

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn render(cmd: clap::Command, dir: &Path, file: &str) -> std::io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    let path = dir.join(file);
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let main_page = render(cmd.clone(), &output_dir, "uvkx.1")?;
    println!("Generated {}", main_page.display());

    for sub in cmd.get_subcommands() {
        let file = format!("uvkx-{}.1", sub.get_name());
        let page = render(sub.clone(), &output_dir, &file)?;
        println!("Generated {}", page.display());
    }

    println!("\nView with: man -l {}", main_page.display());
    Ok(())
}
