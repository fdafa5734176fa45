use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use alloy_primitives::{hex, Address, Signature, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Result};
use clap::Parser;
use kyc_verifier::{typed_data_digest, Deployment, KycMessage};

/// Issue a KYC attestation: sign `KYC { user, issuedAt }` for a deployed verifier.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Deployment record of the verifier the attestation is for.
    #[clap(long, value_name = "FILE", default_value = "deployment.json")]
    deployment: PathBuf,

    /// Address being attested.
    #[clap(long)]
    user: Address,

    /// Attestation time in Unix seconds. Defaults to now.
    #[clap(long)]
    issued_at: Option<U256>,

    /// Issuer private key.
    #[clap(long, env = "ISSUER_PRIVATE_KEY")]
    private_key: PrivateKeySigner,
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

    let signer = args.private_key;
    if signer.address() != deployment.issuer {
        warn!(
            signer = %signer.address(),
            issuer = %deployment.issuer,
            "signing key is not the deployment's issuer; the verifier will reject this attestation"
        );
    }

    let issued_at = match args.issued_at {
        Some(issued_at) => issued_at,
        None => U256::from(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs()),
    };
    let message = KycMessage::new(args.user, issued_at);
    let domain = deployment.domain();

    // The payload a wallet would be asked to sign must hash to what the verifier rebuilds.
    let payload = domain.signing_request(&message);
    let digest = domain.signing_hash(&message);
    let payload_digest = typed_data_digest(&payload.to_string())?;
    if payload_digest != digest {
        bail!("typed-data payload digest {payload_digest} does not match verifier digest {digest}");
    }

    let signature: Signature = signer.sign_hash_sync(&digest)?;

    println!("Typed data: {}", serde_json::to_string_pretty(&payload)?);
    println!("User: {:#x}", args.user);
    println!("Issued at: {issued_at}");
    println!("Digest (EIP-712): {digest}");
    println!("Signature: 0x{}", hex::encode(signature.as_bytes()));
    println!("Signer: {:#x}", signer.address());

    Ok(())
}
