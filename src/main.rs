#![forbid(unsafe_code)]

//! dbb — Device Backup Browser CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("dbb: {e}");
        std::process::exit(e.exit_code());
    }
}
