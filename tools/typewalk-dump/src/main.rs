// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typewalk-dump - decode and print a MessagePack frame.
//!
//! Usage:
//!   typewalk-dump frame.bin
//!   some-producer | typewalk-dump --hex
//!   typewalk-dump frame.bin --indent 2
//!   typewalk-dump frame.bin --config walk.toml
//!
//! The config's `max_depth` also bounds how deeply the frame's maps may nest.

use anyhow::Context;
use clap::Parser;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typewalk::{decode_frame_with, print_frame, WalkConfig};

#[derive(Parser, Debug)]
#[command(name = "typewalk-dump")]
#[command(about = "Decode and pretty-print a typewalk MessagePack frame")]
#[command(version)]
struct Args {
    /// Frame file (stdin if omitted)
    file: Option<PathBuf>,

    /// Also print a hex dump of the raw frame
    #[arg(long)]
    hex: bool,

    /// Spaces per nesting level (overrides the config file)
    #[arg(long)]
    indent: Option<usize>,

    /// Walk configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let bytes = read_input(args.file.as_deref())?;
    debug!("read {} bytes", bytes.len());

    let mut out = String::new();
    if args.hex {
        hex_dump(&bytes, &mut out)?;
        out.push('\n');
    }
    let frame = decode_frame_with(&bytes, config.max_depth).context("decoding frame")?;
    debug!("decoded {} top-level fields", frame.len());
    print_frame(&frame, &mut out, config.indent_width)?;

    print!("{}", out);
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<WalkConfig> {
    let mut config = match &args.config {
        Some(path) => WalkConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => WalkConfig::default(),
    };
    if let Some(indent) = args.indent {
        config = config.with_indent_width(indent);
    }
    config.validate()?;
    Ok(config)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("reading stdin")?;
            Ok(bytes)
        }
    }
}

/// 16 bytes per row: offset, hex bytes split in two groups, printable ASCII.
fn hex_dump<W: fmt::Write>(data: &[u8], out: &mut W) -> fmt::Result {
    for (i, chunk) in data.chunks(16).enumerate() {
        write!(out, "{:04x}  ", i * 16)?;
        for j in 0..16 {
            if j == 8 {
                out.write_char(' ')?;
            }
            match chunk.get(j) {
                Some(byte) => write!(out, "{:02x} ", byte)?,
                None => out.write_str("   ")?,
            }
        }
        out.write_str(" |")?;
        for &byte in chunk {
            let c = if (0x20..0x7f).contains(&byte) {
                byte as char
            } else {
                '.'
            };
            out.write_char(c)?;
        }
        out.write_str("|\n")?;
    }
    Ok(())
}
