// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typewalk-gen - compile a `.type` schema into Rust structs.
//!
//! # Usage
//!
//! ```bash
//! # Print the generated module
//! typewalk-gen messages.type
//!
//! # Write it next to the crate sources
//! typewalk-gen messages.type -o src/messages.rs
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use typewalk_gen::{emit_rust, parse_schema, SchemaItem};

/// Compile a .type schema into typewalk-described Rust structs
#[derive(Parser, Debug)]
#[command(name = "typewalk-gen")]
#[command(version, about)]
struct Args {
    /// Schema file
    input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

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

    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let items = parse_schema(&source).with_context(|| args.input.display().to_string())?;

    let type_count = items
        .iter()
        .filter(|item| matches!(item, SchemaItem::Type(_)))
        .count();
    tracing::info!("{}: {} type(s)", args.input.display(), type_count);

    let code = emit_rust(&items);
    match &args.output {
        Some(path) => {
            std::fs::write(path, code).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}
