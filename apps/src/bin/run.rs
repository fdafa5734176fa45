use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use alloy_primitives::{hex, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Result};
use clap::Parser;
use kyc_verifier::{Deployment, InMemoryLedger, KycMessage, DEFAULT_CHAIN_ID};

/// Walk through deploy, attest, verify and query against an in-memory ledger.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Issuer private key; a random one is generated if omitted.
    #[clap(long, env = "ISSUER_PRIVATE_KEY")]
    issuer_key: Option<PrivateKeySigner>,

    /// User private key; a random one is generated if omitted.
    #[clap(long, env = "USER_PRIVATE_KEY")]
    user_key: Option<PrivateKeySigner>,

    #[clap(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,
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
    let issuer = args.issuer_key.unwrap_or_else(PrivateKeySigner::random);
    let user = args.user_key.unwrap_or_else(PrivateKeySigner::random);
    println!("Using issuer account: {:#x}", issuer.address());

    // 1. Deploy
    let deployment = Deployment::new(issuer.address(), args.chain_id, issuer.address(), 0)?;
    let mut verifier = deployment.verifier(InMemoryLedger::new())?;
    println!("KYCVerifier deployed to: {:#x}", deployment.verifying_contract);

    // 2. Issuer signs the attestation off-band
    let issued_at = U256::from(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs());
    let message = KycMessage::new(user.address(), issued_at);
    let digest = deployment.domain().signing_hash(&message);
    let signature = issuer.sign_hash_sync(&digest)?.as_bytes();
    println!("Generated KYC signature: 0x{}", hex::encode(signature));

    // 3. A signature from anyone else is refused
    let forged = user.sign_hash_sync(&digest)?.as_bytes();
    match verifier.verify_kyc(user.address(), issued_at, &forged) {
        Ok(()) => bail!("forged signature was accepted"),
        Err(e) => println!("Self-signed attempt rejected: {e}"),
    }

    // 4. The user submits the issuer's signature
    verifier.verify_kyc(user.address(), issued_at, &signature)?;

    // 5. Confirm status
    println!(
        "User {:#x} verified? {}",
        user.address(),
        verifier.is_verified(&user.address())
    );
    Ok(())
}
