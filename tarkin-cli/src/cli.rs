//! CLI argument definitions for `tarkin`

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tarkin")]
#[command(about = "Decode a BMOF (Binary Managed Object Format) container to JSON")]
#[command(version)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Print version and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: (),

    /// Path to the BMOF container to decode
    pub path: PathBuf,

    /// Path to the external DoubleSpace decompression helper binary
    #[arg(long, env = "TARKIN_DECOMPRESSOR", default_value = "ds_decompress")]
    pub decompressor: PathBuf,

    /// Fail instead of warn when a flavor entry has no matching qualifier
    #[arg(long)]
    pub flavor_strict: bool,

    /// Pretty-print JSON output (default: compact)
    #[arg(long)]
    pub pretty: bool,

    /// Suppress tracing output below WARN
    #[arg(short, long)]
    pub quiet: bool,
}
