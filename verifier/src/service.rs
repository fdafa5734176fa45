use alloy_primitives::{Address, B256, U256};
use tracing::{debug, info, warn};

use crate::error::{ConstructionError, KycError};
use crate::ledger::{InMemoryLedger, VerificationLedger};
use crate::policy::ensure_issuer;
use crate::signing::recover_signer;
use crate::typed_data::{KycDomain, KycMessage};

/// Records users as KYC-verified on presentation of an issuer-signed attestation.
///
/// Users move from unverified to verified exactly once and never back. The
/// issuer and domain are fixed at construction; the ledger is only reachable
/// through [`KycVerifier::verify_kyc`] and [`KycVerifier::is_verified`].
#[derive(Debug)]
pub struct KycVerifier<L = InMemoryLedger> {
    issuer: Address,
    domain: KycDomain,
    ledger: L,
}

impl KycVerifier<InMemoryLedger> {
    /// A verifier with an empty in-memory ledger.
    pub fn new(issuer: Address, domain: KycDomain) -> Result<Self, ConstructionError> {
        Self::with_ledger(issuer, domain, InMemoryLedger::new())
    }
}

impl<L: VerificationLedger> KycVerifier<L> {
    /// A verifier backed by an existing ledger.
    pub fn with_ledger(
        issuer: Address,
        domain: KycDomain,
        ledger: L,
    ) -> Result<Self, ConstructionError> {
        if issuer.is_zero() {
            return Err(ConstructionError::ZeroIssuer);
        }
        info!(
            %issuer,
            chain_id = domain.chain_id,
            verifying_contract = %domain.verifying_contract,
            "KYC verifier ready"
        );
        Ok(Self {
            issuer,
            domain,
            ledger,
        })
    }

    pub fn issuer(&self) -> Address {
        self.issuer
    }

    pub fn domain(&self) -> &KycDomain {
        &self.domain
    }

    /// The digest the issuer must sign to attest `user` at `issued_at`.
    pub fn digest(&self, user: Address, issued_at: U256) -> B256 {
        self.domain.signing_hash(&KycMessage::new(user, issued_at))
    }

    /// Mark `user` verified if `signature` is the issuer's signature over
    /// `{user, issued_at}` in this verifier's domain.
    ///
    /// Any malformed or foreign signature fails with
    /// [`KycError::InvalidSignature`] and leaves the ledger untouched.
    pub fn verify_kyc(
        &mut self,
        user: Address,
        issued_at: U256,
        signature: &[u8],
    ) -> Result<(), KycError> {
        let digest = self.digest(user, issued_at);
        debug!(%user, %issued_at, %digest, "checking KYC attestation");

        let recovered = match recover_signer(&digest, signature) {
            Ok(recovered) => recovered,
            Err(e) => {
                debug!(%user, error = %e, "signature recovery failed");
                warn!(%user, "rejected KYC attestation");
                return Err(KycError::InvalidSignature);
            }
        };
        if let Err(e) = ensure_issuer(recovered, &self.issuer) {
            debug!(%user, error = %e, "signer is not the issuer");
            warn!(%user, "rejected KYC attestation");
            return Err(KycError::InvalidSignature);
        }

        self.ledger.mark_verified(user)?;
        info!(%user, "user KYC-verified");
        Ok(())
    }

    /// Whether `user` has ever been verified. Unknown users are not.
    pub fn is_verified(&self, user: &Address) -> bool {
        self.ledger.is_verified(user)
    }
}
