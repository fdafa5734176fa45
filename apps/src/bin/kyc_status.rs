use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::Result;
use clap::Parser;
use kyc_verifier::{Deployment, JsonFileLedger};

/// Query whether an address has been KYC-verified.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long, value_name = "FILE", default_value = "deployment.json")]
    deployment: PathBuf,

    #[clap(long, value_name = "FILE", default_value = "ledger.json")]
    ledger: PathBuf,

    /// Address to look up.
    user: Address,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let deployment = Deployment::load(&args.deployment)?;
    let verifier = deployment.verifier(JsonFileLedger::open(&args.ledger)?)?;

    println!("User {:#x} verified? {}", args.user, verifier.is_verified(&args.user));
    Ok(())
}
