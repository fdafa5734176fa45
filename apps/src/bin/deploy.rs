use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Result};
use clap::Parser;
use kyc_verifier::{Deployment, JsonFileLedger, DEFAULT_CHAIN_ID};
use url::Url;

/// Instantiate a KYC verifier for an issuer and write its deployment record.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Private key of the deploying account.
    #[clap(long, env = "DEPLOYER_PRIVATE_KEY")]
    private_key: PrivateKeySigner,

    /// Authorized issuer. Defaults to the deployer.
    #[clap(long)]
    issuer: Option<Address>,

    /// Chain id of the target network.
    #[clap(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,

    /// Deployer account nonce used to derive the instance address.
    #[clap(long, default_value_t = 0)]
    nonce: u64,

    /// URL of the network's RPC endpoint, recorded in the deployment.
    #[clap(short, long, env = "RPC_URL")]
    rpc_url: Option<Url>,

    /// Where to write the deployment record.
    #[clap(long, value_name = "FILE", default_value = "deployment.json")]
    deployment: PathBuf,

    /// Where to create the verification ledger.
    #[clap(long, value_name = "FILE", default_value = "ledger.json")]
    ledger: PathBuf,

    /// Replace an existing deployment and wipe its ledger.
    #[clap(long)]
    force: bool,
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

    if !args.force {
        for path in [&args.deployment, &args.ledger] {
            if path.exists() {
                bail!("{} already exists; pass --force to replace it", path.display());
            }
        }
    }

    let deployer = args.private_key.address();
    let issuer = args.issuer.unwrap_or(deployer);
    println!("Deploying KYCVerifier with issuer: {issuer:#x}");

    let deployment =
        Deployment::new(issuer, args.chain_id, deployer, args.nonce)?.with_rpc_url(args.rpc_url);
    deployment.save(&args.deployment)?;

    if args.ledger.exists() {
        fs::remove_file(&args.ledger)?;
    }
    JsonFileLedger::open(&args.ledger)?.flush()?;
    info!(
        deployment = %args.deployment.display(),
        ledger = %args.ledger.display(),
        "wrote deployment"
    );

    println!("KYCVerifier deployed to: {:#x}", deployment.verifying_contract);
    Ok(())
}
