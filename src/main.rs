//! Reports where the encrypted data marker first appears in the harbor binary.

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use sigfind::{read_input, Report, Signature};

const INPUT_PATH: &str = "harbor_binary_stripped";

fn init_logging() {
    let filter = EnvFilter::try_from_env("SIGFIND_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("sigfind: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let bytes = read_input(INPUT_PATH).with_context(|| format!("failed to read {}", INPUT_PATH))?;
    println!("{}", Report::new(&bytes, &Signature::ENCRYPTED_DATA));
    Ok(())
}
