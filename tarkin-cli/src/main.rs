//! `tarkin` - BMOF (Binary Managed Object Format) container decoder

mod cli;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tarkin::container::ExecDecompressor;
use tarkin::Container;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.root_cause().downcast_ref::<std::io::Error>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "tarkin=warn" } else { "tarkin=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let data = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {:?}", args.path))?;

    let decompressor = ExecDecompressor::new(args.decompressor.clone());
    let container = Container::decode(&data, &decompressor)
        .with_context(|| format!("failed to decode {:?}", args.path))?;

    let json = render::render(&container.root, args.flavor_strict)?;

    let stdout = std::io::stdout();
    let handle = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(handle, &json)?;
    } else {
        serde_json::to_writer(handle, &json)?;
    }
    println!();

    Ok(())
}
