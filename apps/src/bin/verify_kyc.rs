use std::path::PathBuf;
use tracing::debug;

use alloy_primitives::{Address, Bytes, U256};
use anyhow::{bail, Result};
use clap::Parser;
use kyc_verifier::{Deployment, JsonFileLedger};

/// Submit an issuer's KYC signature and record the user as verified.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Deployment record of the verifier.
    #[clap(long, value_name = "FILE", default_value = "deployment.json")]
    deployment: PathBuf,

    /// Verification ledger of the deployment.
    #[clap(long, value_name = "FILE", default_value = "ledger.json")]
    ledger: PathBuf,

    /// Address being verified.
    #[clap(long)]
    user: Address,

    /// The `issuedAt` the issuer signed.
    #[clap(long)]
    issued_at: U256,

    /// 65-byte r||s||v signature, hex encoded.
    #[clap(long)]
    signature: Bytes,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => bail!("failed to load .env file: {}", e),
    }

    let args = Args::parse();
    let deployment = Deployment::load(&args.deployment)?;
    let mut verifier = deployment.verifier(JsonFileLedger::open(&args.ledger)?)?;

    verifier.verify_kyc(args.user, args.issued_at, &args.signature)?;

    println!("User {:#x} verified? {}", args.user, verifier.is_verified(&args.user));
    Ok(())
}
