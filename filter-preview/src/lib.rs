//! Filter preview application
//!
//! Loads an image (or a directory of images), runs it through the
//! `image-filter` pipeline and writes the live preview as PNG files.
//!
//! # Architecture
//! - `desktop_main` is the entry point used by the binary
//! - Global configuration loaded from a TOML file, overridden by CLI flags
//! - Filter runs are offloaded to blocking workers and their results are
//!   marshaled back onto the UI loop through a channel

#[macro_use]
extern crate derivative;

pub mod cli;
mod config;
mod logic;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line number,
/// and log message. `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

pub async fn desktop_main() -> Result<()> {
    let cli = Cli::parse();

    init_logger();
    config::init(cli.config.clone())?;

    logic::run(cli).await
}
