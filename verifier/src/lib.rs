//! Issuer-attested KYC verification.
//!
//! A single trusted issuer signs `KYC { user, issuedAt }` as EIP-712 typed
//! data, off-band. Anyone can submit that signature to a [`KycVerifier`],
//! which rebuilds the digest, recovers the signer, and permanently marks the
//! user verified if the signer is the issuer.

pub mod deployment;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod service;
pub mod signing;
pub mod typed_data;

pub use deployment::{Deployment, DEFAULT_CHAIN_ID};
pub use error::{
    ConstructionError, DeploymentError, KycError, LedgerError, RecoveryError, TypedDataError,
    UnauthorizedError, INVALID_KYC_SIGNATURE,
};
pub use ledger::{InMemoryLedger, JsonFileLedger, VerificationLedger};
pub use policy::authorize;
pub use service::KycVerifier;
pub use signing::recover_signer;
pub use typed_data::{typed_data_digest, KycDomain, KycMessage};
